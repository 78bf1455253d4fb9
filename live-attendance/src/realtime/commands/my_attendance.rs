use super::{RealtimeCommand, Reply};
use crate::{
    attendance_session::coordinator::AttendanceSession,
    errors::command_error::CommandError,
    models::{role::Role, transient::authenticated_user::AuthenticatedUser},
    realtime::message::OutboundMessage,
};
use serde_json::Value;

pub struct MyAttendance<'a> {
    session: &'a AttendanceSession,
}

impl<'a> MyAttendance<'a> {
    pub fn new(session: &'a AttendanceSession) -> Self {
        MyAttendance { session }
    }
}

impl RealtimeCommand for MyAttendance<'_> {
    fn required_role(&self) -> Role {
        Role::Student
    }

    async fn handle(&self, user: &AuthenticatedUser, _data: Value) -> Result<Reply, CommandError> {
        let status = self.session.student_status(user.user_id)?;
        Ok(Reply::Sender(OutboundMessage::my_attendance(status)))
    }
}
