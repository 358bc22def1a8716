//! Events a room emits towards its participants.
//!
//! These are protocol-neutral; the infrastructure layer decides how they are
//! encoded on the wire.

use serde::Serialize;

use super::{
    entity::{ChatMessage, QuizSummary, Stroke},
    value_object::{ConnectionId, DisplayName, OptionIndex, ParticipantId, RoomId},
};

/// Lifecycle state of a room, without the per-question details
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// Public view of a participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub id: ParticipantId,
    pub name: DisplayName,
}

/// A question as shown to players (no answer key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
}

/// A suggestion as shown to players
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionView {
    pub author: PlayerSummary,
    pub answer: OptionIndex,
    pub votes: usize,
}

/// Everything a (re)joining participant needs to render the room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub quiz: QuizSummary,
    pub players: Vec<PlayerSummary>,
    pub group_score: u32,
    pub status: RoomStatus,
    pub host: Option<ParticipantId>,
    pub question: Option<QuestionView>,
    pub question_number: Option<usize>,
    pub suggestions: Vec<SuggestionView>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    RoomJoined(RoomSnapshot),
    PlayerJoined {
        players: Vec<PlayerSummary>,
    },
    PlayerLeft {
        players: Vec<PlayerSummary>,
    },
    /// `number` is one-based
    NewQuestion {
        question: QuestionView,
        number: usize,
    },
    NewSuggestion {
        author: PlayerSummary,
        answer: OptionIndex,
    },
    VoteUpdate {
        answer: OptionIndex,
        votes: usize,
    },
    QuestionResult {
        winning_answer: Option<OptionIndex>,
        correct_answer: OptionIndex,
        is_correct: bool,
        group_score: u32,
    },
    QuizFinished {
        group_score: u32,
        total_questions: usize,
    },
    Chat(ChatMessage),
    WhiteboardDraw(Stroke),
    WhiteboardClear,
    Error {
        message: String,
    },
}

/// Who receives an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Connection(ConnectionId),
    Everyone,
    EveryoneExcept(ConnectionId),
}

/// An event addressed to an audience within one room
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub audience: Audience,
    pub event: RoomEvent,
}

impl Notification {
    pub fn to(connection: ConnectionId, event: RoomEvent) -> Self {
        Self {
            audience: Audience::Connection(connection),
            event,
        }
    }

    pub fn everyone(event: RoomEvent) -> Self {
        Self {
            audience: Audience::Everyone,
            event,
        }
    }

    pub fn everyone_except(connection: ConnectionId, event: RoomEvent) -> Self {
        Self {
            audience: Audience::EveryoneExcept(connection),
            event,
        }
    }
}
