//! HTTP API request and response bodies.

use serde::{Deserialize, Serialize};

use super::websocket::{QuizSummaryDto, RoomStatusDto};

/// `POST /api/rooms` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub quiz_id: String,
    #[serde(default)]
    pub room_id: Option<String>,
}

/// `POST /api/rooms` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
}

/// Entry of `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub id: String,
    pub quiz_id: String,
    pub status: RoomStatusDto,
    /// Participant ids in join order
    pub participants: Vec<String>,
    /// RFC 3339
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetailDto {
    pub id: String,
    pub name: String,
    /// RFC 3339
    pub joined_at: String,
}

/// `GET /api/rooms/{room_id}` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub quiz: QuizSummaryDto,
    pub status: RoomStatusDto,
    pub host: Option<String>,
    pub participants: Vec<ParticipantDetailDto>,
    pub group_score: u32,
    pub question_number: Option<usize>,
    pub created_at: String,
}

/// Body of every HTTP error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

