//! UseCase: apply one participant command to a room
//!
//! Loads the room, runs the command through the room's transition table,
//! stores the result and delivers the resulting notifications. A finished room
//! left by its last participant is reported as retired instead of stored; the
//! caller then drops it with [`HandleRoomCommandUseCase::retire`]. Callers must
//! serialize invocations per room (see [`super::room_mailbox`]).

use std::sync::Arc;

use quizroom_shared::time::Clock;

use crate::domain::{
    Actor, MessagePusher, Notification, RoomCommand, RoomError, RoomId, RoomRepository,
    RoomSession, Timestamp,
};

/// What became of the room after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomLifecycle {
    Active,
    Retired,
}

pub struct HandleRoomCommandUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl HandleRoomCommandUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// Apply `command` on behalf of `actor`.
    ///
    /// A rejected command leaves the stored room untouched and returns the
    /// protocol error; reporting it to the client is up to the caller.
    pub async fn execute(
        &self,
        room_id: &RoomId,
        actor: &Actor,
        command: RoomCommand,
    ) -> Result<RoomLifecycle, RoomError> {
        let mut room = self.repository.get_room(room_id).await?;
        let now = Timestamp::new(self.clock.now_millis());
        let name = command.name();
        let mutates = command.mutates_room();

        let notifications = room.apply(actor, command, now)?;
        tracing::debug!(
            "Room '{}': '{}' applied {} ({} notifications)",
            room_id,
            actor.identity.id,
            name,
            notifications.len()
        );

        let lifecycle = if room.is_retired() {
            RoomLifecycle::Retired
        } else {
            if mutates {
                self.repository.save_room(room.clone()).await?;
            }
            RoomLifecycle::Active
        };

        self.deliver(&room, notifications).await;
        Ok(lifecycle)
    }

    /// Drop a retired room from the repository
    pub async fn retire(&self, room_id: &RoomId) {
        match self.repository.remove_room(room_id).await {
            Ok(()) => tracing::info!("Room '{}' finished and empty, retired", room_id),
            Err(e) => tracing::warn!("Failed to retire room '{}': {}", room_id, e),
        }
    }

    async fn deliver(&self, room: &RoomSession, notifications: Vec<Notification>) {
        for notification in notifications {
            let targets = room.targets(&notification.audience);
            if let Err(e) = self
                .message_pusher
                .broadcast(targets, &notification.event)
                .await
            {
                tracing::warn!("Failed to deliver event in room '{}': {}", room.id, e);
            }
        }
    }
}
