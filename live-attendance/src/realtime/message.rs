use crate::models::{status::Status, transient::active_session::Summary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const NOT_YET_UPDATED: &str = "not yet updated";
pub const DONE_MESSAGE: &str = "Attendance persisted";

/// Client frame: `{"event": ..., "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum OutboundMessage {
    #[serde(rename = "ERROR")]
    Error { message: String },

    #[serde(rename = "ATTENDANCE_MARKED", rename_all = "camelCase")]
    AttendanceMarked { student_id: i32, status: Status },

    #[serde(rename = "TODAY_SUMMARY")]
    TodaySummary(Summary),

    #[serde(rename = "MY_ATTENDANCE")]
    MyAttendance { status: String },

    #[serde(rename = "DONE")]
    Done {
        message: String,
        present: usize,
        absent: usize,
        total: usize,
    },
}

impl OutboundMessage {
    pub fn error(message: impl Into<String>) -> Self {
        OutboundMessage::Error {
            message: message.into(),
        }
    }

    pub fn my_attendance(status: Option<Status>) -> Self {
        OutboundMessage::MyAttendance {
            status: status
                .map(|status| status.as_str())
                .unwrap_or(NOT_YET_UPDATED)
                .to_string(),
        }
    }

    pub fn done(summary: Summary) -> Self {
        OutboundMessage::Done {
            message: DONE_MESSAGE.to_string(),
            present: summary.present,
            absent: summary.absent,
            total: summary.total,
        }
    }

    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
