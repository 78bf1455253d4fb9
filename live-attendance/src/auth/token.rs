use crate::{
    errors::auth_error::AuthError,
    models::{role::Role, transient::authenticated_user::AuthenticatedUser},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    user_id: i32,
    role: Role,
    exp: i64,
}

/// Signs an HS256 token carrying the user's id and role.
pub fn issue_token(
    user_id: i32,
    role: Role,
    secret: &str,
    ttl: Duration,
) -> Result<String, AuthError> {
    let claims = Claims {
        user_id,
        role,
        exp: (Utc::now() + ttl).timestamp(),
    };

    Ok(jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Checks signature and expiry, returning the identity the token was issued for.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthenticatedUser, AuthError> {
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;

    Ok(AuthenticatedUser::new(data.claims.user_id, data.claims.role))
}
