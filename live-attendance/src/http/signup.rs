use super::{AppState, success};
use crate::{
    errors::api_error::ApiError,
    models::{role::Role, user::PublicUser},
    schema::users::{self, dsl::users as users_table, email, name, password, role},
};
use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::{
    ExpressionMethods, OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper,
    dsl::insert_into,
};
use email_address::EmailAddress;
use log::trace;
use serde::Deserialize;

const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Deserialize)]
pub(crate) struct SignUp {
    name: String,
    email: String,
    password: String,
    role: Role,
}

pub(crate) async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignUp>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) =
        payload.or(Err(ApiError::BadRequest("Invalid request schema".to_string())))?;

    if !EmailAddress::is_valid(payload.email.as_str()) {
        return Err(ApiError::BadRequest("Invalid email address".to_string()));
    }

    if payload.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(
            "password must be at least 6 characters".to_string(),
        ));
    }

    let normalized_email = payload.email.to_lowercase();
    let connection = &mut state
        .pool
        .get()
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    if users_table
        .filter(email.eq(&normalized_email))
        .select(users::id)
        .first::<i32>(connection)
        .optional()?
        .is_some()
    {
        return Err(ApiError::BadRequest("Email already exists".to_string()));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|error| ApiError::Internal(error.to_string()))?
        .to_string();

    insert_into(users_table)
        .values((
            name.eq(payload.name.trim()),
            email.eq(&normalized_email),
            password.eq(&password_hash),
            role.eq(payload.role.as_str()),
        ))
        .execute(connection)?;

    let user = users_table
        .filter(email.eq(&normalized_email))
        .select(PublicUser::as_select())
        .first(connection)?;

    trace!("{normalized_email} signed up as {}", payload.role);
    Ok((StatusCode::CREATED, success(user)))
}
