use super::{AppState, success};
use crate::{
    auth::token::issue_token,
    errors::api_error::ApiError,
    models::{role::Role, user::User},
    schema::users::{dsl::users, email},
};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub(crate) struct Login {
    email: String,
    password: String,
}

fn invalid_credentials() -> ApiError {
    ApiError::BadRequest("Invalid email or password".to_string())
}

pub(crate) async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Login>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) =
        payload.or(Err(ApiError::BadRequest("Invalid request schema".to_string())))?;

    let connection = &mut state
        .pool
        .get()
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    let user = users
        .filter(email.eq(payload.email.to_lowercase()))
        .select(User::as_select())
        .first(connection)
        .optional()?
        .ok_or_else(invalid_credentials)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    Argon2::default()
        .verify_password(payload.password.as_bytes(), &parsed_hash)
        .or(Err(invalid_credentials()))?;

    let user_role = user
        .role
        .parse::<Role>()
        .map_err(ApiError::Internal)?;
    let token = issue_token(user.id, user_role, &state.jwt_secret, state.token_ttl)
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    Ok(success(json!({ "token": token })))
}
