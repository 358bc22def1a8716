//! Domain layer
//!
//! Pure room logic plus the interfaces (repository, pusher, quiz store,
//! identity provider) it needs from the outside world.

pub mod command;
pub mod entity;
pub mod error;
pub mod event;
pub mod identity;
pub mod message_pusher;
pub mod quiz_store;
pub mod repository;
pub mod room;
pub mod value_object;

pub use command::{Actor, ClientRequest, RoomCommand};
pub use entity::{ChatMessage, Identity, Participant, Question, Quiz, QuizSummary, Stroke, Suggestion};
pub use error::{
    AuthError, MessagePushError, QuizStoreError, RepositoryError, RoomError, ValueObjectError,
};
pub use event::{
    Audience, Notification, PlayerSummary, QuestionView, RoomEvent, RoomSnapshot, RoomStatus,
    SuggestionView,
};
pub use identity::IdentityProvider;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use quiz_store::QuizStore;
pub use repository::RoomRepository;
pub use room::{DEFAULT_PARTICIPANT_CAPACITY, QuestionRound, RoomPhase, RoomSession, RoundResult};
pub use value_object::{
    AuthToken, ChatText, ConnectionId, DisplayName, OptionIndex, ParticipantId, QuizId, RoomId,
    RoomIdFactory, Timestamp,
};
