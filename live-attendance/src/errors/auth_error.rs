use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Unauthorized, token missing or invalid")]
    MissingToken,
    #[error("Unauthorized, token missing or invalid")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}
