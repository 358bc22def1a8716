//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{Actor, ClientRequest, RoomCommand, RoomError, RoomId},
    infrastructure::dto::websocket::ClientCommand,
    ui::state::AppState,
    usecase::ConnectError,
};

/// Upgrade to a websocket after checking the `Authorization: Bearer` header.
///
/// Missing or unknown tokens are refused with 401 before the upgrade.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, StatusCode> {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state.connect_participant_usecase.execute(authorization).await {
        Ok(actor) => Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, actor))),
        Err(ConnectError::Unauthorized(e)) => {
            tracing::warn!("Rejecting websocket upgrade: {}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Spawns a task that receives frames from the rx channel and writes them to
/// the websocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Per-connection state: who is talking and which room they are in
struct Session {
    actor: Actor,
    current_room: Option<RoomId>,
}

impl Session {
    async fn handle_text(&mut self, state: &AppState, text: &str) {
        let request = match serde_json::from_str::<ClientCommand>(text) {
            Ok(command) => ClientRequest::try_from(command),
            Err(e) => Err(RoomError::InvalidMessage(e.to_string())),
        };

        match request {
            Ok(ClientRequest::JoinRoom(room_id)) => self.join(state, room_id).await,
            Ok(ClientRequest::InRoom(command)) => self.in_room(state, command).await,
            Err(e) => {
                tracing::debug!("Rejected frame from {}: {}", self.actor.connection, e);
                state
                    .room_mailbox
                    .report_error(&self.actor.connection, &e)
                    .await;
            }
        }
    }

    async fn join(&mut self, state: &AppState, room_id: RoomId) {
        // Joining another room leaves the current one first.
        if let Some(previous) = self.current_room.take_if(|current| *current != room_id) {
            let _ = state
                .room_mailbox
                .dispatch(&previous, self.actor.clone(), RoomCommand::Leave)
                .await;
        }

        if state
            .room_mailbox
            .dispatch(&room_id, self.actor.clone(), RoomCommand::Join)
            .await
            .is_ok()
        {
            tracing::info!("'{}' joined room '{}'", self.actor.identity.id, room_id);
            self.current_room = Some(room_id);
        }
    }

    async fn in_room(&mut self, state: &AppState, command: RoomCommand) {
        let Some(room_id) = self.current_room.clone() else {
            state
                .room_mailbox
                .report_error(&self.actor.connection, &RoomError::NotInRoom)
                .await;
            return;
        };

        let leaving = command == RoomCommand::Leave;
        let _ = state
            .room_mailbox
            .dispatch(&room_id, self.actor.clone(), command)
            .await;
        if leaving {
            self.current_room = None;
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, actor: Actor) {
    // Channel feeding this connection's writer task
    let (tx, rx) = mpsc::unbounded_channel();
    state.connect_participant_usecase.attach(&actor, tx).await;

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);
    let mut session = Session {
        actor,
        current_room: None,
    };

    // Frames are handled one at a time, so a connection's commands reach its
    // room in arrival order.
    loop {
        tokio::select! {
            _ = &mut send_task => break,
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    tracing::debug!("Received from {}: {}", session.actor.connection, text.as_str());
                    session.handle_text(&state, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Connection {} closed by client", session.actor.connection);
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error on {}: {}", session.actor.connection, e);
                    break;
                }
            },
        }
    }

    send_task.abort();
    state
        .disconnect_participant_usecase
        .execute(&session.actor, session.current_room)
        .await;
}
