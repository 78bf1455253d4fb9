use super::{RealtimeCommand, Reply};
use crate::{
    attendance_session::coordinator::AttendanceSession,
    errors::command_error::CommandError,
    models::{role::Role, transient::authenticated_user::AuthenticatedUser},
    persistence::PersistenceBridge,
    realtime::message::OutboundMessage,
};
use serde_json::Value;

pub struct Done<'a> {
    session: &'a AttendanceSession,
    bridge: &'a dyn PersistenceBridge,
}

impl<'a> Done<'a> {
    pub fn new(session: &'a AttendanceSession, bridge: &'a dyn PersistenceBridge) -> Self {
        Done { session, bridge }
    }
}

impl RealtimeCommand for Done<'_> {
    fn required_role(&self) -> Role {
        Role::Teacher
    }

    async fn handle(&self, _user: &AuthenticatedUser, _data: Value) -> Result<Reply, CommandError> {
        let result = self.session.finalize(self.bridge).await?;
        Ok(Reply::Broadcast(OutboundMessage::done(result.summary)))
    }
}
