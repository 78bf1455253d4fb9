use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Could not get connection from pool: {0}")]
    Pool(String),
    #[error("Query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("Attendance already recorded for student {student_id} in class {class_id}")]
    Duplicate { class_id: i32, student_id: i32 },
    #[error("Blocking database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Memory store lock poisoned")]
    LockPoisoned,
}
