use crate::models::status::Status;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// The one in-flight attendance session.
///
/// `attendance` only holds students that were explicitly marked; a missing
/// entry means the student has not been marked yet.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub generation: u64,
    pub class_id: i32,
    pub started_at: DateTime<Utc>,
    pub attendance: HashMap<i32, Status>,
}

impl ActiveSession {
    pub fn new(generation: u64, class_id: i32) -> Self {
        ActiveSession {
            generation,
            class_id,
            started_at: Utc::now(),
            attendance: HashMap::new(),
        }
    }

    pub fn status_of(&self, student_id: i32) -> Option<Status> {
        self.attendance.get(&student_id).copied()
    }

    pub fn summary(&self) -> Summary {
        Summary::from_marks(self.attendance.values())
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            class_id: self.class_id,
            started_at: self.started_at,
        }
    }
}

/// Read-only view returned when a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
    pub class_id: i32,
    pub started_at: DateTime<Utc>,
}

/// Present/absent counts over explicitly marked students.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub present: usize,
    pub absent: usize,
    pub total: usize,
}

impl Summary {
    pub fn from_marks<'a>(marks: impl IntoIterator<Item = &'a Status>) -> Self {
        marks
            .into_iter()
            .fold(Summary::default(), |mut summary, status| {
                match status {
                    Status::Present => summary.present += 1,
                    Status::Absent => summary.absent += 1,
                }
                summary.total += 1;
                summary
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_only_marked_students() {
        let mut session = ActiveSession::new(1, 7);
        session.attendance.insert(1, Status::Present);
        session.attendance.insert(2, Status::Absent);
        session.attendance.insert(3, Status::Present);

        assert_eq!(
            session.summary(),
            Summary {
                present: 2,
                absent: 1,
                total: 3
            }
        );
    }

    #[test]
    fn empty_session_has_zero_summary() {
        let session = ActiveSession::new(1, 7);
        assert_eq!(session.summary(), Summary::default());
        assert_eq!(session.status_of(1), None);
    }
}
