use crate::{
    errors::command_error::CommandError,
    models::{role::Role, transient::authenticated_user::AuthenticatedUser},
    realtime::message::OutboundMessage,
};
use serde_json::Value;

pub mod attendance_marked;
pub mod done;
pub mod my_attendance;
pub mod today_summary;

/// Who receives the result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Broadcast(OutboundMessage),
    Sender(OutboundMessage),
}

pub trait RealtimeCommand {
    fn required_role(&self) -> Role;

    async fn handle(&self, user: &AuthenticatedUser, data: Value) -> Result<Reply, CommandError>;
}

/// Enforces the command's role before running it.
pub async fn process_command(
    command: &impl RealtimeCommand,
    user: &AuthenticatedUser,
    data: Value,
) -> Result<Reply, CommandError> {
    match command.required_role() {
        Role::Teacher if !user.is_teacher() => Err(CommandError::TeacherOnly),
        Role::Student if !user.is_student() => Err(CommandError::StudentOnly),
        _ => command.handle(user, data).await,
    }
}
