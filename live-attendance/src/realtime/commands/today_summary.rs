use super::{RealtimeCommand, Reply};
use crate::{
    attendance_session::coordinator::AttendanceSession,
    errors::command_error::CommandError,
    models::{role::Role, transient::authenticated_user::AuthenticatedUser},
    realtime::message::OutboundMessage,
};
use serde_json::Value;

pub struct TodaySummary<'a> {
    session: &'a AttendanceSession,
}

impl<'a> TodaySummary<'a> {
    pub fn new(session: &'a AttendanceSession) -> Self {
        TodaySummary { session }
    }
}

impl RealtimeCommand for TodaySummary<'_> {
    fn required_role(&self) -> Role {
        Role::Teacher
    }

    async fn handle(&self, _user: &AuthenticatedUser, _data: Value) -> Result<Reply, CommandError> {
        let summary = self.session.summary()?;
        Ok(Reply::Broadcast(OutboundMessage::TodaySummary(summary)))
    }
}
