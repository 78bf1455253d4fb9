use crate::errors::session_error::SessionError;
use thiserror::Error;

/// Failure of a realtime event. The `Display` text is what the sender sees
/// in the `ERROR` reply, so it never carries internal details.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Forbidden, teacher event only")]
    TeacherOnly,
    #[error("Forbidden, student event only")]
    StudentOnly,
    #[error("No active attendance session")]
    NoActiveSession,
    #[error("Invalid message format")]
    Malformed,
    #[error("Invalid event data")]
    InvalidData,
    #[error("Unknown event")]
    UnknownEvent,
    #[error("Class not found")]
    ClassNotFound,
    #[error("Something went wrong")]
    Internal(String),
}

impl From<SessionError> for CommandError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotFound => CommandError::NoActiveSession,
            SessionError::ClassNotFound => CommandError::ClassNotFound,
            other => CommandError::Internal(other.to_string()),
        }
    }
}
