use crate::{auth::token::verify_token, errors::api_error::ApiError, http::AppState};
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

/// Verifies the bearer token and exposes the caller as an `AuthenticatedUser` extension.
pub async fn authentication(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|authorization| authorization.to_str().ok())
        .and_then(|authorization| authorization.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized(
            "Unauthorized, token missing or invalid".to_string(),
        ))?;

    let user = verify_token(token, &state.jwt_secret)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
