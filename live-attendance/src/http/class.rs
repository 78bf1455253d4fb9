use super::{AppState, require_role, success};
use crate::{
    errors::api_error::ApiError,
    models::{
        class::Class, role::Role, transient::authenticated_user::AuthenticatedUser,
        user::PublicUser,
    },
    schema::{attendances, class_students, classes, users},
};
use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use diesel::{
    BoolExpressionMethods, Connection, ExpressionMethods, JoinOnDsl, MysqlConnection,
    OptionalExtension, QueryDsl, RunQueryDsl, SelectableHelper, dsl::sql, insert_into,
    insert_or_ignore_into, mysql::Mysql, sql_types::Integer,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateClass {
    class_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddStudent {
    student_id: i32,
}

#[derive(Serialize)]
struct ClassDetails {
    #[serde(flatten)]
    class: Class,
    students: Vec<PublicUser>,
}

fn class_students_of(
    connection: &mut MysqlConnection,
    class_id: i32,
) -> Result<Vec<PublicUser>, diesel::result::Error> {
    class_students::table
        .inner_join(users::table.on(users::id.eq(class_students::student_id)))
        .filter(class_students::class_id.eq(class_id))
        .select(PublicUser::as_select())
        .load(connection)
}

/// The row this connection inserted last, unaffected by inserts on other connections.
fn last_inserted_class() -> classes::BoxedQuery<'static, Mysql> {
    classes::table
        .filter(classes::id.eq(sql::<Integer>("LAST_INSERT_ID()")))
        .into_boxed()
}

pub(crate) async fn create_class(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<CreateClass>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, Role::Teacher)?;
    let Json(payload) =
        payload.or(Err(ApiError::BadRequest("ClassName must be string".to_string())))?;

    let connection = &mut state
        .pool
        .get()
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    let created = connection.transaction(|connection| {
        insert_into(classes::table)
            .values((
                classes::class_name.eq(payload.class_name.trim()),
                classes::teacher_id.eq(user.user_id),
            ))
            .execute(connection)?;

        last_inserted_class()
            .select(Class::as_select())
            .first(connection)
    })?;

    Ok((StatusCode::CREATED, success(created)))
}

pub(crate) async fn add_student(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(class_id): Path<i32>,
    payload: Result<Json<AddStudent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, Role::Teacher)?;
    let Json(payload) =
        payload.or(Err(ApiError::BadRequest("Invalid request schema".to_string())))?;

    let connection = &mut state
        .pool
        .get()
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    let is_student = users::table
        .find(payload.student_id)
        .select(users::role)
        .first::<String>(connection)
        .optional()?
        .is_some_and(|found_role| found_role == Role::Student.as_str());

    if !is_student {
        return Err(ApiError::BadRequest("Invalid student".to_string()));
    }

    let class = classes::table
        .filter(
            classes::id
                .eq(class_id)
                .and(classes::teacher_id.eq(user.user_id)),
        )
        .select(Class::as_select())
        .first(connection)
        .optional()?
        .ok_or(ApiError::NotFound("Class not found".to_string()))?;

    insert_or_ignore_into(class_students::table)
        .values((
            class_students::class_id.eq(class.id),
            class_students::student_id.eq(payload.student_id),
        ))
        .execute(connection)?;

    let students = class_students_of(connection, class.id)?;
    Ok(success(ClassDetails { class, students }))
}

pub(crate) async fn get_class(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(class_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let connection = &mut state
        .pool
        .get()
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    let class = classes::table
        .find(class_id)
        .select(Class::as_select())
        .first(connection)
        .optional()?
        .ok_or(ApiError::NotFound("Class not found".to_string()))?;

    let students = class_students_of(connection, class.id)?;

    let is_owner = user.is_teacher() && class.teacher_id == user.user_id;
    let is_enrolled =
        user.is_student() && students.iter().any(|student| student.id == user.user_id);

    if !is_owner && !is_enrolled {
        return Err(ApiError::Forbidden("Forbidden".to_string()));
    }

    Ok(success(ClassDetails { class, students }))
}

/// The caller's persisted status for a class, `null` until a session for it is finalized.
pub(crate) async fn my_attendance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(class_id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&user, Role::Student)?;

    let connection = &mut state
        .pool
        .get()
        .map_err(|error| ApiError::Internal(error.to_string()))?;

    let status = attendances::table
        .filter(attendances::class_id.eq(class_id))
        .filter(attendances::student_id.eq(user.user_id))
        .select(attendances::status)
        .first::<String>(connection)
        .optional()?;

    Ok(success(json!({ "classId": class_id, "status": status })))
}
