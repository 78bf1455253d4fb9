use super::{AppState, require_role, success};
use crate::{
    attendance_session::coordinator::AttendanceSession,
    errors::api_error::ApiError,
    models::{
        attendance::Attendance,
        role::Role,
        transient::{active_session::SessionHandle, authenticated_user::AuthenticatedUser},
    },
    persistence::PersistenceBridge,
    schema::attendances,
};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
};
use diesel::{QueryDsl, RunQueryDsl, SelectableHelper};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartAttendance {
    class_id: i32,
}

/// Opens a session for `class_id` once the caller is confirmed as the class's teacher.
pub(crate) async fn start_session(
    session: &AttendanceSession,
    bridge: &dyn PersistenceBridge,
    user: &AuthenticatedUser,
    class_id: i32,
) -> Result<SessionHandle, ApiError> {
    require_role(user, Role::Teacher)?;

    let class = bridge
        .find_class(class_id)
        .await?
        .ok_or(ApiError::NotFound("Class not found".to_string()))?;

    if class.teacher_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Forbidden, not class teacher".to_string(),
        ));
    }

    Ok(session.start(class.id)?)
}

pub(crate) async fn start(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<StartAttendance>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) =
        payload.or(Err(ApiError::BadRequest("Invalid request schema".to_string())))?;

    let handle = start_session(
        &state.session,
        state.bridge.as_ref(),
        &user,
        payload.class_id,
    )
    .await?;

    Ok(success(handle))
}

pub(crate) async fn all(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, Role::Teacher)?;

    let connection = &mut state
        .pool
        .get()
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    let records: Vec<Attendance> = attendances::table
        .select(Attendance::as_select())
        .load(connection)?;

    Ok(success(records))
}
