use crate::models::class::Class;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;

/// Durable per-student record written when a session is finalized.
#[derive(Queryable, Selectable, Identifiable, Associations, Serialize, Debug, Clone)]
#[diesel(belongs_to(Class))]
#[diesel(table_name = crate::schema::attendances)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i32,
    pub class_id: i32,
    pub student_id: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
}
