use crate::errors::persistence_error::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Attendance session already active")]
    Conflict,
    #[error("No active attendance session")]
    NotFound,
    #[error("Class not found")]
    ClassNotFound,
    #[error("Could not get attendance session, lock poisoned")]
    LockPoisoned,
    #[error("Could not reach persistence: {0}")]
    Persistence(#[from] PersistenceError),
}
