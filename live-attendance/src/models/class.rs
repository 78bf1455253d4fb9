use diesel::prelude::*;
use serde::Serialize;

#[derive(Queryable, Selectable, Identifiable, Serialize, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::classes)]
#[diesel(check_for_backend(diesel::mysql::Mysql))]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: i32,
    pub class_name: String,
    pub teacher_id: i32,
}
