//! Conversion logic between DTOs and domain models.

use quizroom_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatText, ClientRequest, OptionIndex, PlayerSummary, QuestionView, QuizSummary, RoomCommand,
    RoomError, RoomEvent, RoomId, RoomSession, RoomSnapshot, RoomStatus, Stroke, SuggestionView,
    ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::StrokeDto> for Stroke {
    type Error = ValueObjectError;

    fn try_from(dto: dto::StrokeDto) -> Result<Self, Self::Error> {
        Stroke::new(
            (dto.x0, dto.y0),
            (dto.x1, dto.y1),
            dto.color,
            dto.brush_size,
            dto.is_erasing,
        )
    }
}

impl TryFrom<dto::ClientCommand> for ClientRequest {
    type Error = RoomError;

    fn try_from(command: dto::ClientCommand) -> Result<Self, Self::Error> {
        let room_command = match command {
            dto::ClientCommand::JoinRoom { room_id } => {
                return Ok(ClientRequest::JoinRoom(RoomId::new(room_id)?));
            }
            dto::ClientCommand::LeaveRoom {} => RoomCommand::Leave,
            dto::ClientCommand::NextQuestion {} => RoomCommand::NextQuestion,
            dto::ClientCommand::ResolveQuestion {} => RoomCommand::ResolveQuestion,
            dto::ClientCommand::SuggestAnswer { answer } => {
                RoomCommand::Suggest(OptionIndex::new(answer))
            }
            dto::ClientCommand::VoteAnswer { answer } => RoomCommand::Vote(OptionIndex::new(answer)),
            dto::ClientCommand::ChatMessage { message } => {
                RoomCommand::Chat(ChatText::new(message)?)
            }
            dto::ClientCommand::WhiteboardDraw(stroke) => RoomCommand::Draw(stroke.try_into()?),
            dto::ClientCommand::WhiteboardClear {} => RoomCommand::ClearWhiteboard,
        };
        Ok(ClientRequest::InRoom(room_command))
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&PlayerSummary> for dto::PlayerDto {
    fn from(player: &PlayerSummary) -> Self {
        Self {
            id: player.id.to_string(),
            name: player.name.as_str().to_string(),
        }
    }
}

impl From<&QuizSummary> for dto::QuizSummaryDto {
    fn from(summary: &QuizSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            title: summary.title.clone(),
            question_count: summary.question_count,
        }
    }
}

impl From<&QuestionView> for dto::QuestionDto {
    fn from(question: &QuestionView) -> Self {
        Self {
            text: question.text.clone(),
            options: question.options.clone(),
        }
    }
}

impl From<&SuggestionView> for dto::SuggestionStateDto {
    fn from(suggestion: &SuggestionView) -> Self {
        Self {
            participant: (&suggestion.author).into(),
            answer: suggestion.answer.value(),
            votes: suggestion.votes,
        }
    }
}

impl From<RoomStatus> for dto::RoomStatusDto {
    fn from(status: RoomStatus) -> Self {
        match status {
            RoomStatus::Waiting => dto::RoomStatusDto::Waiting,
            RoomStatus::Playing => dto::RoomStatusDto::Playing,
            RoomStatus::Finished => dto::RoomStatusDto::Finished,
        }
    }
}

impl From<&Stroke> for dto::StrokeDto {
    fn from(stroke: &Stroke) -> Self {
        Self {
            x0: stroke.x0,
            y0: stroke.y0,
            x1: stroke.x1,
            y1: stroke.y1,
            color: stroke.color.clone(),
            brush_size: stroke.brush_size,
            is_erasing: stroke.is_erasing,
        }
    }
}

impl From<&RoomSnapshot> for dto::RoomStateDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            room_id: snapshot.room_id.to_string(),
            quiz: (&snapshot.quiz).into(),
            players: players(&snapshot.players),
            group_score: snapshot.group_score,
            status: snapshot.status.into(),
            host: snapshot.host.as_ref().map(|h| h.to_string()),
            question: snapshot.question.as_ref().map(Into::into),
            question_number: snapshot.question_number,
            suggestions: snapshot.suggestions.iter().map(Into::into).collect(),
        }
    }
}

impl From<&RoomEvent> for dto::ServerEvent {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::RoomJoined(snapshot) => dto::ServerEvent::RoomJoined {
                room: snapshot.into(),
            },
            RoomEvent::PlayerJoined { players: list } => dto::ServerEvent::PlayerJoined {
                players: players(list),
            },
            RoomEvent::PlayerLeft { players: list } => dto::ServerEvent::PlayerLeft {
                players: players(list),
            },
            RoomEvent::NewQuestion { question, number } => dto::ServerEvent::NewQuestion {
                question: question.into(),
                question_number: *number,
            },
            RoomEvent::NewSuggestion { author, answer } => dto::ServerEvent::NewSuggestion {
                suggestion: dto::SuggestionDto {
                    participant: author.into(),
                    answer: answer.value(),
                },
            },
            RoomEvent::VoteUpdate { answer, votes } => dto::ServerEvent::VoteUpdate {
                answer: answer.value(),
                votes: *votes,
            },
            RoomEvent::QuestionResult {
                winning_answer,
                correct_answer,
                is_correct,
                group_score,
            } => dto::ServerEvent::QuestionResult {
                winning_answer: winning_answer.map(|a| a.value()),
                correct_answer: correct_answer.value(),
                is_correct: *is_correct,
                group_score: *group_score,
            },
            RoomEvent::QuizFinished {
                group_score,
                total_questions,
            } => dto::ServerEvent::QuizFinished {
                group_score: *group_score,
                total_questions: *total_questions,
            },
            RoomEvent::Chat(message) => dto::ServerEvent::ChatMessage {
                player_name: message.sender_name.as_str().to_string(),
                message: message.text.as_str().to_string(),
                timestamp: message.timestamp.value(),
            },
            RoomEvent::WhiteboardDraw(stroke) => dto::ServerEvent::WhiteboardDraw(stroke.into()),
            RoomEvent::WhiteboardClear => dto::ServerEvent::WhiteboardClear {},
            RoomEvent::Error { message } => dto::ServerEvent::Error {
                message: message.clone(),
            },
        }
    }
}

impl From<&RoomSession> for http::RoomSummaryDto {
    fn from(room: &RoomSession) -> Self {
        Self {
            id: room.id.to_string(),
            quiz_id: room.quiz.id.to_string(),
            status: room.status().into(),
            participants: room.participants.iter().map(|p| p.id.to_string()).collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&RoomSession> for http::RoomDetailDto {
    fn from(room: &RoomSession) -> Self {
        Self {
            id: room.id.to_string(),
            quiz: (&room.quiz.summary()).into(),
            status: room.status().into(),
            host: room.host.as_ref().map(|h| h.to_string()),
            participants: room
                .participants
                .iter()
                .map(|p| http::ParticipantDetailDto {
                    id: p.id.to_string(),
                    name: p.name.as_str().to_string(),
                    joined_at: timestamp_to_rfc3339(p.joined_at.value()),
                })
                .collect(),
            group_score: room.group_score,
            question_number: room.current_question_index().map(|i| i + 1),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

fn players(list: &[PlayerSummary]) -> Vec<dto::PlayerDto> {
    list.iter().map(Into::into).collect()
}
