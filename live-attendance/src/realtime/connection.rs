use crate::{
    errors::command_error::CommandError,
    models::transient::authenticated_user::AuthenticatedUser,
    realtime::{gateway::Gateway, message::OutboundMessage},
};
use axum::{
    Router,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt, stream::SplitSink};
use log::{error, info, trace, warn};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authenticated,
    Active,
    Closed,
}

#[derive(Deserialize)]
pub struct ConnectParams {
    token: Option<String>,
}

pub fn router(gateway: Arc<Gateway>) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(gateway)
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(gateway): State<Arc<Gateway>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, gateway, params.token))
}

fn transition(state: &mut ConnectionState, next: ConnectionState) {
    trace!("Realtime connection {state:?} -> {next:?}");
    *state = next;
}

fn live_connections(gateway: &Gateway) -> usize {
    gateway.registry().count().unwrap_or_else(|error| {
        error!("{error}");
        0
    })
}

async fn reject(sender: &mut SplitSink<WebSocket, Message>, reason: String) {
    let frame = match OutboundMessage::error(reason).to_frame() {
        Ok(frame) => frame,
        Err(error) => {
            error!("Could not serialize realtime message: {error}");
            return;
        }
    };

    if let Err(error) = sender.send(Message::Text(frame.into())).await {
        warn!("Could not send rejection: {error}");
    }

    if let Err(error) = sender.send(Message::Close(None)).await {
        warn!("Could not close rejected connection: {error}");
    }
}

async fn handle_socket(socket: WebSocket, gateway: Arc<Gateway>, token: Option<String>) {
    let mut state = ConnectionState::Connecting;
    let (mut sender, mut receiver) = socket.split();

    let user: AuthenticatedUser = match gateway.authenticate(token.as_deref()) {
        Ok(user) => user,
        Err(error) => {
            warn!("Rejecting realtime connection: {error}");
            reject(&mut sender, error.to_string()).await;
            transition(&mut state, ConnectionState::Closed);
            return;
        }
    };
    transition(&mut state, ConnectionState::Authenticated);

    let (connection_id, mut rx) = match gateway.registry().register(user) {
        Ok(registered) => registered,
        Err(error) => {
            error!("Could not register realtime connection: {error}");
            reject(&mut sender, CommandError::Internal(error.to_string()).to_string()).await;
            transition(&mut state, ConnectionState::Closed);
            return;
        }
    };
    transition(&mut state, ConnectionState::Active);
    info!(
        "User {} connected as {}, {} live connections",
        user.user_id,
        user.role,
        live_connections(&gateway)
    );

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(error) = sender.send(Message::Text(frame.as_str().to_owned().into())).await {
                warn!("Could not send to realtime client: {error}");
                break;
            }
        }
    });

    while let Some(received) = receiver.next().await {
        match received {
            Ok(Message::Text(text)) => {
                gateway
                    .handle_message(&connection_id, &user, text.as_str())
                    .await
            }
            Ok(Message::Binary(_)) => gateway.reply_error(&connection_id, &CommandError::Malformed),
            Ok(Message::Close(_)) => break,
            Ok(_) => (),
            Err(error) => {
                warn!("Realtime transport error for user {}: {error}", user.user_id);
                break;
            }
        }
    }

    if let Err(error) = gateway.registry().unregister(&connection_id) {
        error!("{error}");
    }
    writer.abort();
    transition(&mut state, ConnectionState::Closed);
    info!(
        "User {} disconnected, {} live connections",
        user.user_id,
        live_connections(&gateway)
    );
}
