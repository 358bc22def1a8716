//! Websocket frames of the room protocol.
//!
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}` with
//! camelCase payload fields. The same types are used by the server to decode
//! commands and by the client to decode events.

use serde::{Deserialize, Serialize};

/// Client → server frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String },
    LeaveRoom {},
    NextQuestion {},
    ResolveQuestion {},
    SuggestAnswer { answer: usize },
    VoteAnswer { answer: usize },
    ChatMessage { message: String },
    WhiteboardDraw(StrokeDto),
    WhiteboardClear {},
}

/// Server → client frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomJoined {
        room: RoomStateDto,
    },
    PlayerJoined {
        players: Vec<PlayerDto>,
    },
    PlayerLeft {
        players: Vec<PlayerDto>,
    },
    #[serde(rename_all = "camelCase")]
    NewQuestion {
        question: QuestionDto,
        question_number: usize,
    },
    NewSuggestion {
        suggestion: SuggestionDto,
    },
    VoteUpdate {
        answer: usize,
        votes: usize,
    },
    #[serde(rename_all = "camelCase")]
    QuestionResult {
        winning_answer: Option<usize>,
        correct_answer: usize,
        is_correct: bool,
        group_score: u32,
    },
    #[serde(rename_all = "camelCase")]
    QuizFinished {
        group_score: u32,
        total_questions: usize,
    },
    #[serde(rename_all = "camelCase")]
    ChatMessage {
        player_name: String,
        message: String,
        timestamp: i64,
    },
    WhiteboardDraw(StrokeDto),
    WhiteboardClear {},
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummaryDto {
    pub id: String,
    pub title: String,
    pub question_count: usize,
}

/// A question without its answer key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDto {
    pub text: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionDto {
    pub participant: PlayerDto,
    pub answer: usize,
}

/// A suggestion with its current vote count, as part of a room snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionStateDto {
    pub participant: PlayerDto,
    pub answer: usize,
    pub votes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatusDto {
    Waiting,
    Playing,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateDto {
    pub room_id: String,
    pub quiz: QuizSummaryDto,
    pub players: Vec<PlayerDto>,
    pub group_score: u32,
    pub status: RoomStatusDto,
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_number: Option<usize>,
    #[serde(default)]
    pub suggestions: Vec<SuggestionStateDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeDto {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: String,
    pub brush_size: f64,
    pub is_erasing: bool,
}
