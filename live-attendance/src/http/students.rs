use super::{AppState, require_role, success};
use crate::{
    errors::api_error::ApiError,
    models::{
        role::Role, transient::authenticated_user::AuthenticatedUser, user::PublicUser,
    },
    schema::users::{dsl::users, role},
};
use axum::{Extension, extract::State, response::IntoResponse};
use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl, SelectableHelper};

pub(crate) async fn students(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, Role::Teacher)?;

    let connection = &mut state
        .pool
        .get()
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    let found: Vec<PublicUser> = users
        .filter(role.eq(Role::Student.as_str()))
        .select(PublicUser::as_select())
        .load(connection)?;

    Ok(success(found))
}
