use super::{AppState, success};
use crate::{
    errors::api_error::ApiError,
    models::{transient::authenticated_user::AuthenticatedUser, user::PublicUser},
    schema::users::dsl::users,
};
use axum::{
    Extension,
    extract::State,
    response::IntoResponse,
};
use diesel::{OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper};

pub(crate) async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    let connection = &mut state
        .pool
        .get()
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    let found = users
        .find(user.user_id)
        .select(PublicUser::as_select())
        .first(connection)
        .optional()?
        .ok_or(ApiError::NotFound("User not found".to_string()))?;

    Ok(success(found))
}
