use crate::{
    errors::persistence_error::PersistenceError,
    models::{class::Class, status::Status},
};
use async_trait::async_trait;

pub mod memory_bridge;
pub mod mysql_bridge;

/// Students enrolled in a class at the time it was fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub class_id: i32,
    pub student_ids: Vec<i32>,
}

/// Storage the attendance coordinator depends on: roster lookups and durable
/// attendance writes.
#[async_trait]
pub trait PersistenceBridge: Send + Sync {
    async fn find_class(&self, class_id: i32) -> Result<Option<Class>, PersistenceError>;

    /// `Ok(None)` when the class does not exist.
    async fn fetch_roster(&self, class_id: i32) -> Result<Option<Roster>, PersistenceError>;

    /// Inserts one record. There is no upsert: a second write for the same
    /// class and student fails with `PersistenceError::Duplicate`.
    async fn write_attendance_record(
        &self,
        class_id: i32,
        student_id: i32,
        status: Status,
    ) -> Result<(), PersistenceError>;
}
