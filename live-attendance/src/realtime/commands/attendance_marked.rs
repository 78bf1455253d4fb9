use super::{RealtimeCommand, Reply};
use crate::{
    attendance_session::coordinator::AttendanceSession,
    errors::command_error::CommandError,
    models::{role::Role, status::Status, transient::authenticated_user::AuthenticatedUser},
    realtime::message::OutboundMessage,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkPayload {
    student_id: i32,
    status: Status,
}

pub struct AttendanceMarked<'a> {
    session: &'a AttendanceSession,
}

impl<'a> AttendanceMarked<'a> {
    pub fn new(session: &'a AttendanceSession) -> Self {
        AttendanceMarked { session }
    }
}

impl RealtimeCommand for AttendanceMarked<'_> {
    fn required_role(&self) -> Role {
        Role::Teacher
    }

    async fn handle(&self, _user: &AuthenticatedUser, data: Value) -> Result<Reply, CommandError> {
        if !self.session.is_active()? {
            return Err(CommandError::NoActiveSession);
        }

        let payload: MarkPayload =
            serde_json::from_value(data).or(Err(CommandError::InvalidData))?;

        if !self
            .session
            .mark_attendance(payload.student_id, payload.status)?
        {
            return Err(CommandError::NoActiveSession);
        }

        Ok(Reply::Broadcast(OutboundMessage::AttendanceMarked {
            student_id: payload.student_id,
            status: payload.status,
        }))
    }
}
