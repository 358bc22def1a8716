//! Use case errors.

use thiserror::Error;

use crate::domain::AuthError;

/// Failure to open a websocket session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("Quiz not found: {0}")]
    QuizNotFound(String),

    #[error("Room already exists: {0}")]
    DuplicateRoom(String),

    #[error("Quiz store unavailable: {0}")]
    QuizStoreUnavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Invalid room id")]
    InvalidRoomId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListQuizzesError {
    #[error("Quiz store unavailable: {0}")]
    QuizStoreUnavailable(String),
}
