//! UseCase: create a room for a quiz
//!
//! Used by `POST /api/rooms` (the creator becomes host) and for rooms
//! preconfigured at server start (first joiner becomes host).

use std::sync::Arc;

use quizroom_shared::time::Clock;

use crate::domain::{
    ParticipantId, QuizId, QuizStore, QuizStoreError, RepositoryError, RoomId, RoomIdFactory,
    RoomRepository, RoomSession, Timestamp,
};

use super::{error::CreateRoomError, room_mailbox::RoomMailbox};

pub struct CreateRoomUseCase {
    quiz_store: Arc<dyn QuizStore>,
    repository: Arc<dyn RoomRepository>,
    mailbox: Arc<RoomMailbox>,
    clock: Arc<dyn Clock>,
    participant_capacity: usize,
}

impl CreateRoomUseCase {
    pub fn new(
        quiz_store: Arc<dyn QuizStore>,
        repository: Arc<dyn RoomRepository>,
        mailbox: Arc<RoomMailbox>,
        clock: Arc<dyn Clock>,
        participant_capacity: usize,
    ) -> Self {
        Self {
            quiz_store,
            repository,
            mailbox,
            clock,
            participant_capacity,
        }
    }

    /// Create a room running `quiz_id`.
    ///
    /// Without `room_id` a fresh id is generated.
    pub async fn execute(
        &self,
        host: Option<ParticipantId>,
        quiz_id: QuizId,
        room_id: Option<RoomId>,
    ) -> Result<RoomId, CreateRoomError> {
        let quiz = self
            .quiz_store
            .find_quiz(&quiz_id)
            .await
            .map_err(|e| match e {
                QuizStoreError::QuizNotFound(id) => CreateRoomError::QuizNotFound(id),
                QuizStoreError::LoadFailed(reason) => CreateRoomError::QuizStoreUnavailable(reason),
            })?;

        let room_id = room_id.unwrap_or_else(RoomIdFactory::generate);
        let room = RoomSession::with_capacity(
            room_id.clone(),
            quiz,
            host,
            Timestamp::new(self.clock.now_millis()),
            self.participant_capacity,
        );

        self.repository
            .insert_room(room)
            .await
            .map_err(|e| match e {
                RepositoryError::DuplicateRoom(id) | RepositoryError::RoomNotFound(id) => {
                    CreateRoomError::DuplicateRoom(id)
                }
            })?;
        self.mailbox.open(room_id.clone()).await;

        tracing::info!("Room '{}' created for quiz '{}'", room_id, quiz_id);
        Ok(room_id)
    }
}
