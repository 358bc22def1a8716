//! UseCase: close a websocket session
//!
//! Leaves the room the connection was in (if any) and unregisters its
//! outbound channel.

use std::sync::Arc;

use crate::domain::{Actor, MessagePusher, RoomCommand, RoomId};

use super::room_mailbox::RoomMailbox;

pub struct DisconnectParticipantUseCase {
    mailbox: Arc<RoomMailbox>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(mailbox: Arc<RoomMailbox>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            mailbox,
            message_pusher,
        }
    }

    pub async fn execute(&self, actor: &Actor, current_room: Option<RoomId>) {
        // Unregister first so the leave notification is not queued to a dead channel.
        self.message_pusher
            .unregister_client(&actor.connection)
            .await;

        if let Some(room_id) = current_room
            && let Err(e) = self
                .mailbox
                .dispatch(&room_id, actor.clone(), RoomCommand::Leave)
                .await
        {
            tracing::warn!(
                "Failed to remove '{}' from room '{}': {}",
                actor.identity.id,
                room_id,
                e
            );
        }

        tracing::info!(
            "Participant '{}' disconnected ({})",
            actor.identity.id,
            actor.connection
        );
    }
}
