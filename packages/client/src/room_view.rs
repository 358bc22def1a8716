//! Local view of a room, rebuilt from server events.

use quizroom_server::infrastructure::dto::websocket::{
    PlayerDto, QuestionDto, QuizSummaryDto, RoomStatusDto, ServerEvent, SuggestionStateDto,
};

const MAX_CHAT_LINES: usize = 200;

/// Outcome of the last resolved question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub winning_answer: Option<usize>,
    pub correct_answer: usize,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub player_name: String,
    pub message: String,
    pub timestamp: i64,
}

/// A suggestion or vote sent but not yet answered by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingChoice {
    Suggestion(usize),
    Vote(usize),
}

/// Reducer state for one room.
///
/// `my_suggestion` and `my_vote` only change once the server confirms them:
/// a sent choice stays pending until the matching `new_suggestion` or
/// `vote_update` arrives, and an `error` drops it. Both are cleared whenever a
/// new question starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomView {
    pub room_id: Option<String>,
    pub quiz: Option<QuizSummaryDto>,
    pub players: Vec<PlayerDto>,
    pub host: Option<String>,
    pub status: Option<RoomStatusDto>,
    pub question: Option<QuestionDto>,
    pub question_number: Option<usize>,
    pub suggestions: Vec<SuggestionStateDto>,
    pub my_suggestion: Option<usize>,
    pub my_vote: Option<usize>,
    pub last_result: Option<RoundOutcome>,
    pub group_score: u32,
    pub finished: bool,
    pub chat: Vec<ChatLine>,
    pub last_error: Option<String>,
    pub pending: Option<PendingChoice>,
}

impl RoomView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_joined(&self) -> bool {
        self.room_id.is_some()
    }

    pub fn suggestion(&self, answer: usize) -> Option<&SuggestionStateDto> {
        self.suggestions.iter().find(|s| s.answer == answer)
    }

    pub fn record_suggestion(&mut self, answer: usize) {
        self.pending = Some(PendingChoice::Suggestion(answer));
    }

    pub fn record_vote(&mut self, answer: usize) {
        self.pending = Some(PendingChoice::Vote(answer));
    }

    /// Forget the room after leaving it.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Apply one server event. Whiteboard events do not touch the view.
    pub fn apply(&mut self, event: &ServerEvent) {
        match event {
            ServerEvent::RoomJoined { room } => {
                *self = Self {
                    room_id: Some(room.room_id.clone()),
                    quiz: Some(room.quiz.clone()),
                    players: room.players.clone(),
                    host: room.host.clone(),
                    status: Some(room.status),
                    question: room.question.clone(),
                    question_number: room.question_number,
                    suggestions: room.suggestions.clone(),
                    group_score: room.group_score,
                    finished: room.status == RoomStatusDto::Finished,
                    chat: std::mem::take(&mut self.chat),
                    ..Self::default()
                };
            }
            ServerEvent::PlayerJoined { players } => {
                self.players = players.clone();
            }
            ServerEvent::PlayerLeft { players } => {
                self.players = players.clone();
                // The server hands the host role to the first remaining player.
                if self
                    .host
                    .as_ref()
                    .is_none_or(|host| !players.iter().any(|p| &p.id == host))
                {
                    self.host = players.first().map(|p| p.id.clone());
                }
            }
            ServerEvent::NewQuestion {
                question,
                question_number,
            } => {
                self.status = Some(RoomStatusDto::Playing);
                self.question = Some(question.clone());
                self.question_number = Some(*question_number);
                self.suggestions.clear();
                self.my_suggestion = None;
                self.my_vote = None;
                self.pending = None;
                self.last_result = None;
            }
            ServerEvent::NewSuggestion { suggestion } => {
                // Answers are unique per question, so the answer identifies ours.
                if self.pending == Some(PendingChoice::Suggestion(suggestion.answer)) {
                    self.pending = None;
                    self.my_suggestion = Some(suggestion.answer);
                }
                self.suggestions.push(SuggestionStateDto {
                    participant: suggestion.participant.clone(),
                    answer: suggestion.answer,
                    votes: 0,
                });
            }
            ServerEvent::VoteUpdate { answer, votes } => {
                if self.pending == Some(PendingChoice::Vote(*answer)) {
                    self.pending = None;
                    self.my_vote = Some(*answer);
                }
                if let Some(suggestion) = self.suggestions.iter_mut().find(|s| s.answer == *answer)
                {
                    suggestion.votes = *votes;
                }
            }
            ServerEvent::QuestionResult {
                winning_answer,
                correct_answer,
                is_correct,
                group_score,
            } => {
                self.last_result = Some(RoundOutcome {
                    winning_answer: *winning_answer,
                    correct_answer: *correct_answer,
                    is_correct: *is_correct,
                });
                self.group_score = *group_score;
            }
            ServerEvent::QuizFinished { group_score, .. } => {
                self.status = Some(RoomStatusDto::Finished);
                self.group_score = *group_score;
                self.finished = true;
            }
            ServerEvent::ChatMessage {
                player_name,
                message,
                timestamp,
            } => {
                self.chat.push(ChatLine {
                    player_name: player_name.clone(),
                    message: message.clone(),
                    timestamp: *timestamp,
                });
                if self.chat.len() > MAX_CHAT_LINES {
                    let overflow = self.chat.len() - MAX_CHAT_LINES;
                    self.chat.drain(..overflow);
                }
            }
            ServerEvent::Error { message } => {
                self.pending = None;
                self.last_error = Some(message.clone());
            }
            ServerEvent::WhiteboardDraw(_) | ServerEvent::WhiteboardClear {} => {}
        }
    }
}
