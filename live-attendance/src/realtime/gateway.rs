use crate::{
    attendance_session::coordinator::AttendanceSession,
    auth::token::verify_token,
    errors::{auth_error::AuthError, command_error::CommandError},
    models::transient::authenticated_user::AuthenticatedUser,
    persistence::PersistenceBridge,
    realtime::{
        commands::{
            Reply, attendance_marked::AttendanceMarked, done::Done, my_attendance::MyAttendance,
            process_command, today_summary::TodaySummary,
        },
        message::{InboundMessage, OutboundMessage},
        registry::ConnectionRegistry,
    },
};
use log::{error, trace, warn};
use std::sync::Arc;

/// Interprets realtime frames against the attendance session and fans the
/// results out to connected clients.
pub struct Gateway {
    session: Arc<AttendanceSession>,
    bridge: Arc<dyn PersistenceBridge>,
    registry: ConnectionRegistry,
    jwt_secret: String,
}

impl Gateway {
    pub fn new(
        session: Arc<AttendanceSession>,
        bridge: Arc<dyn PersistenceBridge>,
        jwt_secret: String,
    ) -> Self {
        Gateway {
            session,
            bridge,
            registry: ConnectionRegistry::new(),
            jwt_secret,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
        verify_token(token.ok_or(AuthError::MissingToken)?, &self.jwt_secret)
    }

    /// Handles one inbound frame. Failures become an `ERROR` reply to the
    /// sender and never end the connection.
    pub async fn handle_message(
        &self,
        connection_id: &Arc<String>,
        user: &AuthenticatedUser,
        frame: &str,
    ) {
        trace!("C {}: {frame}", user.user_id);

        let Ok(message) = serde_json::from_str::<InboundMessage>(frame) else {
            self.reply_error(connection_id, &CommandError::Malformed);
            return;
        };

        let result = match message.event.as_str() {
            "ATTENDANCE_MARKED" => {
                process_command(&AttendanceMarked::new(&self.session), user, message.data).await
            }
            "TODAY_SUMMARY" => {
                process_command(&TodaySummary::new(&self.session), user, message.data).await
            }
            "MY_ATTENDANCE" => {
                process_command(&MyAttendance::new(&self.session), user, message.data).await
            }
            "DONE" => {
                process_command(
                    &Done::new(&self.session, self.bridge.as_ref()),
                    user,
                    message.data,
                )
                .await
            }
            _ => Err(CommandError::UnknownEvent),
        };

        match result {
            Ok(Reply::Broadcast(message)) => self.broadcast(&message),
            Ok(Reply::Sender(message)) => self.send(connection_id, &message),
            Err(error) => self.reply_error(connection_id, &error),
        }
    }

    pub fn reply_error(&self, connection_id: &Arc<String>, error: &CommandError) {
        if let CommandError::Internal(details) = error {
            error!("Realtime command failed: {details}");
        }

        let message = OutboundMessage::error(error.to_string());
        warn!("S {connection_id}: {error}");
        self.send(connection_id, &message);
    }

    fn send(&self, connection_id: &Arc<String>, message: &OutboundMessage) {
        let frame = match message.to_frame() {
            Ok(frame) => Arc::new(frame),
            Err(error) => {
                error!("Could not serialize realtime message: {error}");
                return;
            }
        };

        trace!("S {connection_id}: {frame}");
        if let Err(error) = self.registry.send_to(connection_id, frame) {
            warn!("{error}");
        }
    }

    fn broadcast(&self, message: &OutboundMessage) {
        let frame = match message.to_frame() {
            Ok(frame) => Arc::new(frame),
            Err(error) => {
                error!("Could not serialize realtime message: {error}");
                return;
            }
        };

        trace!("S *: {frame}");
        if let Err(error) = self.registry.broadcast(frame) {
            error!("Could not broadcast: {error}");
        }
    }
}
