//! Domain errors.

use thiserror::Error;

/// Validation failures of value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("{0} may only contain letters, digits, '-' and '_'")]
    InvalidCharacters(&'static str),

    #[error("authorization header must use the Bearer scheme")]
    MissingBearerScheme,

    #[error("invalid stroke: {0}")]
    InvalidStroke(&'static str),
}

/// Protocol errors of a room session.
///
/// The display string is sent verbatim to the offending client as the
/// `error` event message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room '{0}' does not exist")]
    RoomNotFound(String),

    #[error("Room is full")]
    RoomFull,

    #[error("You have not joined this room")]
    NotInRoom,

    #[error("Only the host can do that")]
    NotHost,

    #[error("The quiz has not started yet")]
    NotStarted,

    #[error("The quiz has already finished")]
    QuizFinished,

    #[error("The current question is closed")]
    QuestionClosed,

    #[error("Resolve the current question before moving on")]
    QuestionStillOpen,

    #[error("Answer option {0} does not exist for this question")]
    InvalidAnswer(usize),

    #[error("You already suggested an answer for this question")]
    DuplicateSuggestion,

    #[error("Answer option {0} was already suggested; vote for it instead")]
    AnswerAlreadySuggested(usize),

    #[error("Nobody has suggested answer option {0}")]
    NoSuchSuggestion(usize),

    #[error("You cannot vote for your own suggestion")]
    SelfVote,

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Room is temporarily unavailable")]
    Unavailable,
}

impl From<ValueObjectError> for RoomError {
    fn from(error: ValueObjectError) -> Self {
        RoomError::InvalidMessage(error.to_string())
    }
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    #[error("Room already exists: {0}")]
    DuplicateRoom(String),
}

impl From<RepositoryError> for RoomError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::RoomNotFound(id) => RoomError::RoomNotFound(id),
            RepositoryError::DuplicateRoom(_) => RoomError::Unavailable,
        }
    }
}

/// Message push errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),

    #[error("Failed to encode event: {0}")]
    EncodeFailed(String),
}

/// Quiz store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizStoreError {
    #[error("Quiz not found: {0}")]
    QuizNotFound(String),

    #[error("Failed to load quizzes: {0}")]
    LoadFailed(String),
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid bearer token")]
    InvalidToken,

    #[error("Failed to load identities: {0}")]
    LoadFailed(String),
}
