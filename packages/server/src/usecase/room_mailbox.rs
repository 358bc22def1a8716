//! Per-room command queue
//!
//! Every room has one worker task draining an unbounded mailbox. Commands for
//! the same room are therefore applied strictly one after another, in arrival
//! order, while different rooms progress independently. A worker stops once
//! its room is retired.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc, oneshot};

use crate::domain::{
    Actor, ConnectionId, MessagePusher, RoomCommand, RoomError, RoomEvent, RoomId,
};

use super::handle_room_command::{HandleRoomCommandUseCase, RoomLifecycle};

/// A queued command and the slot its outcome is reported on
struct MailboxMessage {
    actor: Actor,
    command: RoomCommand,
    respond_to: oneshot::Sender<Result<(), RoomError>>,
}

type Workers = Arc<Mutex<HashMap<RoomId, mpsc::UnboundedSender<MailboxMessage>>>>;

pub struct RoomMailbox {
    workers: Workers,
    handler: Arc<HandleRoomCommandUseCase>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RoomMailbox {
    pub fn new(
        handler: Arc<HandleRoomCommandUseCase>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            workers: Arc::new(Mutex::new(HashMap::new())),
            handler,
            message_pusher,
        }
    }

    /// Start the worker of a room. Opening an already open room is a no-op.
    pub async fn open(&self, room_id: RoomId) {
        let mut workers = self.workers.lock().await;
        if workers.contains_key(&room_id) {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(room_worker(
            room_id.clone(),
            rx,
            self.handler.clone(),
            self.workers.clone(),
        ));
        workers.insert(room_id.clone(), tx);
        tracing::debug!("Mailbox opened for room '{}'", room_id);
    }

    /// Queue a command and wait until the room worker has applied it.
    ///
    /// On failure an `error` event is pushed to the actor's connection before
    /// the error is returned.
    pub async fn dispatch(
        &self,
        room_id: &RoomId,
        actor: Actor,
        command: RoomCommand,
    ) -> Result<(), RoomError> {
        let connection = actor.connection;
        let result = self.enqueue(room_id, actor, command).await;

        if let Err(error) = &result {
            self.report_error(&connection, error).await;
        }

        result
    }

    /// Push an `error` event to a single connection
    pub async fn report_error(&self, connection: &ConnectionId, error: &RoomError) {
        let event = RoomEvent::Error {
            message: error.to_string(),
        };
        if let Err(e) = self.message_pusher.push_to(connection, &event).await {
            tracing::debug!("Could not report error to {}: {}", connection, e);
        }
    }

    async fn enqueue(
        &self,
        room_id: &RoomId,
        actor: Actor,
        command: RoomCommand,
    ) -> Result<(), RoomError> {
        let sender = self
            .workers
            .lock()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))?;

        let (tx, rx) = oneshot::channel();
        // A closed mailbox belongs to a room retired meanwhile.
        sender
            .send(MailboxMessage {
                actor,
                command,
                respond_to: tx,
            })
            .map_err(|_| RoomError::RoomNotFound(room_id.to_string()))?;

        rx.await.map_err(|_| RoomError::Unavailable)?
    }
}

async fn room_worker(
    room_id: RoomId,
    mut rx: mpsc::UnboundedReceiver<MailboxMessage>,
    handler: Arc<HandleRoomCommandUseCase>,
    workers: Workers,
) {
    while let Some(message) = rx.recv().await {
        let result = handler
            .execute(&room_id, &message.actor, message.command)
            .await;
        let retired = result == Ok(RoomLifecycle::Retired);
        // The dispatcher may have gone away (connection closed); the command
        // has been applied regardless.
        let _ = message.respond_to.send(result.map(|_| ()));

        if retired {
            // Unmap before dropping the room so a room created under the same
            // id gets a fresh worker.
            let mut open_workers = workers.lock().await;
            open_workers.remove(&room_id);
            handler.retire(&room_id).await;
            drop(open_workers);

            rx.close();
            while let Some(late) = rx.recv().await {
                let _ = late
                    .respond_to
                    .send(Err(RoomError::RoomNotFound(room_id.to_string())));
            }
            break;
        }
    }
    tracing::debug!("Mailbox for room '{}' closed", room_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            OptionIndex, RoomRepository, RoomStatus,
            room::test_fixtures::{identity, room},
        },
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        },
    };
    use quizroom_shared::time::FixedClock;

    async fn setup() -> (Arc<RoomMailbox>, Arc<InMemoryRoomRepository>, Arc<WebSocketMessagePusher>, RoomId) {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let room = room();
        let room_id = room.id.clone();
        repository.insert_room(room).await.unwrap();
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let handler = Arc::new(HandleRoomCommandUseCase::new(
            repository.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(0)),
        ));
        let mailbox = Arc::new(RoomMailbox::new(handler, pusher.clone()));
        mailbox.open(room_id.clone()).await;
        (mailbox, repository, pusher, room_id)
    }

    #[tokio::test]
    async fn test_unknown_room_pushes_error_event() {
        // given:
        let (mailbox, _repository, pusher, _room_id) = setup().await;
        let actor = Actor::new(identity("p1"), ConnectionId::generate());
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(actor.connection, tx).await;
        let missing = RoomId::new("missing".to_string()).unwrap();

        // when:
        let result = mailbox.dispatch(&missing, actor, RoomCommand::Join).await;

        // then:
        assert_eq!(result, Err(RoomError::RoomNotFound("missing".to_string())));
        let frame = rx.recv().await.unwrap();
        assert!(frame.contains(r#""event":"error""#));
        assert!(frame.contains("Room 'missing' does not exist"));
    }

    #[tokio::test]
    async fn test_retired_room_stops_accepting_commands() {
        // given: p1 finishes the quiz alone
        let (mailbox, repository, _pusher, room_id) = setup().await;
        let host = Actor::new(identity("p1"), ConnectionId::generate());
        mailbox
            .dispatch(&room_id, host.clone(), RoomCommand::Join)
            .await
            .unwrap();
        for command in [
            RoomCommand::NextQuestion,
            RoomCommand::ResolveQuestion,
            RoomCommand::NextQuestion,
            RoomCommand::ResolveQuestion,
        ] {
            mailbox
                .dispatch(&room_id, host.clone(), command)
                .await
                .unwrap();
        }

        // when: the last participant leaves
        mailbox
            .dispatch(&room_id, host.clone(), RoomCommand::Leave)
            .await
            .unwrap();

        // then:
        assert!(repository.list_rooms().await.is_empty());
        assert_eq!(
            mailbox.dispatch(&room_id, host, RoomCommand::Join).await,
            Err(RoomError::RoomNotFound("R1".to_string()))
        );
    }

    #[tokio::test]
    async fn test_concurrent_suggestions_are_serialized() {
        // given: a started room with eight members
        let (mailbox, repository, _pusher, room_id) = setup().await;
        let host = Actor::new(identity("p0"), ConnectionId::generate());
        mailbox
            .dispatch(&room_id, host.clone(), RoomCommand::Join)
            .await
            .unwrap();
        let guests: Vec<Actor> = (1..8)
            .map(|i| Actor::new(identity(&format!("p{i}")), ConnectionId::generate()))
            .collect();
        for guest in &guests {
            mailbox
                .dispatch(&room_id, guest.clone(), RoomCommand::Join)
                .await
                .unwrap();
        }
        mailbox
            .dispatch(&room_id, host.clone(), RoomCommand::NextQuestion)
            .await
            .unwrap();

        // when: everyone races to suggest option 1
        let mut tasks = Vec::new();
        for guest in guests {
            let mailbox = mailbox.clone();
            let room_id = room_id.clone();
            tasks.push(tokio::spawn(async move {
                mailbox
                    .dispatch(&room_id, guest, RoomCommand::Suggest(OptionIndex::new(1)))
                    .await
            }));
        }
        let mut accepted = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        // then: exactly one suggestion won
        assert_eq!(accepted, 1);
        let stored = repository.get_room(&room_id).await.unwrap();
        assert_eq!(stored.status(), RoomStatus::Playing);
        assert_eq!(stored.snapshot().suggestions.len(), 1);
    }
}
