//! Room session state machine.
//!
//! A [`RoomSession`] is mutated only through the transition methods below.
//! Each method validates the command against the current phase, applies it,
//! and returns the notifications to deliver. A rejected command leaves the
//! room untouched.
//!
//! ```text
//! Waiting --next--> Playing(q1) --resolve--> Playing(q1, closed) --next--> Playing(q2) ...
//!                                                     \--resolve last--> Finished
//! ```

use std::cmp::Reverse;

use serde::Serialize;

use super::{
    command::{Actor, RoomCommand},
    entity::{ChatMessage, Identity, Participant, Quiz, Stroke, Suggestion},
    error::RoomError,
    event::{
        Audience, Notification, PlayerSummary, QuestionView, RoomEvent, RoomSnapshot, RoomStatus,
        SuggestionView,
    },
    value_object::{ChatText, ConnectionId, OptionIndex, ParticipantId, RoomId, Timestamp},
};

/// Default maximum number of participants in one room
pub const DEFAULT_PARTICIPANT_CAPACITY: usize = 32;

/// Outcome of a resolved question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundResult {
    pub winning_answer: Option<OptionIndex>,
    pub is_correct: bool,
}

/// State of the question currently on screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRound {
    /// Zero-based index into the quiz questions
    pub index: usize,
    /// In submission order
    pub suggestions: Vec<Suggestion>,
    pub result: Option<RoundResult>,
}

impl QuestionRound {
    fn new(index: usize) -> Self {
        Self {
            index,
            suggestions: Vec::new(),
            result: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.result.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RoomPhase {
    Waiting,
    Playing(QuestionRound),
    Finished,
}

/// Server-side authoritative collaborative quiz instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSession {
    pub id: RoomId,
    pub quiz: Quiz,
    pub host: Option<ParticipantId>,
    /// In join order
    pub participants: Vec<Participant>,
    pub phase: RoomPhase,
    pub group_score: u32,
    pub participant_capacity: usize,
    pub created_at: Timestamp,
}

impl RoomSession {
    /// Create a room in the `Waiting` phase.
    ///
    /// Without an explicit host, the first participant to join becomes host.
    /// An explicit host keeps the role only if they are the first to join.
    pub fn new(id: RoomId, quiz: Quiz, host: Option<ParticipantId>, created_at: Timestamp) -> Self {
        Self::with_capacity(id, quiz, host, created_at, DEFAULT_PARTICIPANT_CAPACITY)
    }

    pub fn with_capacity(
        id: RoomId,
        quiz: Quiz,
        host: Option<ParticipantId>,
        created_at: Timestamp,
        participant_capacity: usize,
    ) -> Self {
        Self {
            id,
            quiz,
            host,
            participants: Vec::new(),
            phase: RoomPhase::Waiting,
            group_score: 0,
            participant_capacity,
            created_at,
        }
    }

    pub fn status(&self) -> RoomStatus {
        match self.phase {
            RoomPhase::Waiting => RoomStatus::Waiting,
            RoomPhase::Playing(_) => RoomStatus::Playing,
            RoomPhase::Finished => RoomStatus::Finished,
        }
    }

    /// Zero-based index of the question on screen, if any
    pub fn current_question_index(&self) -> Option<usize> {
        match &self.phase {
            RoomPhase::Playing(round) => Some(round.index),
            _ => None,
        }
    }

    /// A finished room nobody is in any more can be dropped
    pub fn is_retired(&self) -> bool {
        self.phase == RoomPhase::Finished && self.participants.is_empty()
    }

    pub fn is_member(&self, participant: &ParticipantId) -> bool {
        self.participants.iter().any(|p| &p.id == participant)
    }

    pub fn players(&self) -> Vec<PlayerSummary> {
        self.participants
            .iter()
            .map(|p| PlayerSummary {
                id: p.id.clone(),
                name: p.name.clone(),
            })
            .collect()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let (question, question_number, suggestions) = match &self.phase {
            RoomPhase::Playing(round) => (
                self.quiz.questions.get(round.index).map(question_view),
                Some(round.index + 1),
                round.suggestions.iter().map(suggestion_view).collect(),
            ),
            _ => (None, None, Vec::new()),
        };

        RoomSnapshot {
            room_id: self.id.clone(),
            quiz: self.quiz.summary(),
            players: self.players(),
            group_score: self.group_score,
            status: self.status(),
            host: self.host.clone(),
            question,
            question_number,
            suggestions,
        }
    }

    /// Resolve an audience to the connections currently in the room
    pub fn targets(&self, audience: &Audience) -> Vec<ConnectionId> {
        match audience {
            Audience::Connection(connection) => vec![*connection],
            Audience::Everyone => self.participants.iter().map(|p| p.connection).collect(),
            Audience::EveryoneExcept(excluded) => self
                .participants
                .iter()
                .map(|p| p.connection)
                .filter(|c| c != excluded)
                .collect(),
        }
    }

    /// Transition table: apply one command issued by `actor`.
    pub fn apply(
        &mut self,
        actor: &Actor,
        command: RoomCommand,
        now: Timestamp,
    ) -> Result<Vec<Notification>, RoomError> {
        let participant = &actor.identity.id;
        match command {
            RoomCommand::Join => self.join(actor.identity.clone(), actor.connection, now),
            RoomCommand::Leave => Ok(self.leave(participant, actor.connection)),
            RoomCommand::NextQuestion => self.advance(participant),
            RoomCommand::ResolveQuestion => self.resolve(participant),
            RoomCommand::Suggest(answer) => self.suggest(participant, answer, now),
            RoomCommand::Vote(answer) => self.vote(participant, answer),
            RoomCommand::Chat(text) => self.chat(participant, text, now),
            RoomCommand::Draw(stroke) => self.draw(participant, actor.connection, stroke),
            RoomCommand::ClearWhiteboard => self.clear_whiteboard(participant),
        }
    }

    // ========================================
    // Membership
    // ========================================

    /// Add a participant, or move an already present identity to a new
    /// connection.
    pub fn join(
        &mut self,
        identity: Identity,
        connection: ConnectionId,
        joined_at: Timestamp,
    ) -> Result<Vec<Notification>, RoomError> {
        if let Some(existing) = self.participants.iter_mut().find(|p| p.id == identity.id) {
            existing.connection = connection;
            existing.name = identity.display_name;
            return Ok(vec![Notification::to(
                connection,
                RoomEvent::RoomJoined(self.snapshot()),
            )]);
        }

        if self.participants.len() >= self.participant_capacity {
            return Err(RoomError::RoomFull);
        }

        // The host must be on the roster.
        if self
            .host
            .as_ref()
            .is_none_or(|host| host != &identity.id && !self.is_member(host))
        {
            self.host = Some(identity.id.clone());
        }
        self.participants
            .push(Participant::new(identity, connection, joined_at));

        Ok(vec![
            Notification::to(connection, RoomEvent::RoomJoined(self.snapshot())),
            Notification::everyone_except(
                connection,
                RoomEvent::PlayerJoined {
                    players: self.players(),
                },
            ),
        ])
    }

    /// Remove a participant.
    ///
    /// Only the connection the participant currently uses can remove them, so
    /// a stale connection closing after a rejoin is a no-op. Suggestions and
    /// votes already cast stay counted.
    pub fn leave(&mut self, participant: &ParticipantId, connection: ConnectionId) -> Vec<Notification> {
        let before = self.participants.len();
        self.participants
            .retain(|p| !(&p.id == participant && p.connection == connection));
        if before == self.participants.len() {
            return Vec::new();
        }

        if self.host.as_ref() == Some(participant) {
            self.host = self.participants.first().map(|p| p.id.clone());
        }

        vec![Notification::everyone(RoomEvent::PlayerLeft {
            players: self.players(),
        })]
    }

    // ========================================
    // Question progression (host only)
    // ========================================

    /// Present the first question, or the next one once the current question
    /// is resolved.
    pub fn advance(&mut self, actor: &ParticipantId) -> Result<Vec<Notification>, RoomError> {
        self.require_member(actor)?;
        self.require_host(actor)?;

        let next_index = match &self.phase {
            RoomPhase::Finished => return Err(RoomError::QuizFinished),
            RoomPhase::Waiting => 0,
            RoomPhase::Playing(round) if round.is_open() => {
                return Err(RoomError::QuestionStillOpen);
            }
            RoomPhase::Playing(round) => round.index + 1,
        };

        let Some(question) = self.quiz.questions.get(next_index) else {
            // Only reachable for a quiz without questions.
            self.phase = RoomPhase::Finished;
            return Ok(vec![self.quiz_finished()]);
        };
        let event = RoomEvent::NewQuestion {
            question: question_view(question),
            number: next_index + 1,
        };
        self.phase = RoomPhase::Playing(QuestionRound::new(next_index));

        Ok(vec![Notification::everyone(event)])
    }

    /// Close the current question: pick the winning suggestion, score it and
    /// finish the quiz after the last question.
    ///
    /// The winner has the most votes; ties go to the earliest submission,
    /// then to the suggestion made first.
    pub fn resolve(&mut self, actor: &ParticipantId) -> Result<Vec<Notification>, RoomError> {
        self.require_member(actor)?;
        self.require_host(actor)?;

        let round = open_round(&mut self.phase)?;
        let question = self
            .quiz
            .questions
            .get(round.index)
            .ok_or(RoomError::Unavailable)?;

        let winner = round.suggestions.iter().reduce(|best, suggestion| {
            let ahead = (suggestion.votes(), Reverse(suggestion.submitted_at))
                > (best.votes(), Reverse(best.submitted_at));
            if ahead { suggestion } else { best }
        });
        let winning_answer = winner.map(|s| s.answer);
        let correct_answer = question.correct_answer;
        let is_correct = winning_answer == Some(correct_answer);

        round.result = Some(RoundResult {
            winning_answer,
            is_correct,
        });
        let is_last = round.index + 1 >= self.quiz.questions.len();

        if is_correct {
            self.group_score += 1;
        }

        let mut notifications = vec![Notification::everyone(RoomEvent::QuestionResult {
            winning_answer,
            correct_answer,
            is_correct,
            group_score: self.group_score,
        })];

        if is_last {
            self.phase = RoomPhase::Finished;
            notifications.push(self.quiz_finished());
        }

        Ok(notifications)
    }

    // ========================================
    // Suggestions and votes
    // ========================================

    /// Propose an answer for the current question (one per participant)
    pub fn suggest(
        &mut self,
        actor: &ParticipantId,
        answer: OptionIndex,
        submitted_at: Timestamp,
    ) -> Result<Vec<Notification>, RoomError> {
        let author = self.member(actor)?;
        let author_summary = PlayerSummary {
            id: author.id.clone(),
            name: author.name.clone(),
        };

        let round = open_round(&mut self.phase)?;
        let question = self
            .quiz
            .questions
            .get(round.index)
            .ok_or(RoomError::Unavailable)?;

        if !question.has_option(answer) {
            return Err(RoomError::InvalidAnswer(answer.value()));
        }
        if round.suggestions.iter().any(|s| &s.author == actor) {
            return Err(RoomError::DuplicateSuggestion);
        }
        if round.suggestions.iter().any(|s| s.answer == answer) {
            return Err(RoomError::AnswerAlreadySuggested(answer.value()));
        }

        round.suggestions.push(Suggestion::new(
            author_summary.id.clone(),
            author_summary.name.clone(),
            answer,
            submitted_at,
        ));

        Ok(vec![Notification::everyone(RoomEvent::NewSuggestion {
            author: author_summary,
            answer,
        })])
    }

    /// Vote for the suggestion with the given answer.
    ///
    /// Voting again for the same suggestion changes nothing; voting for another
    /// suggestion moves the vote.
    pub fn vote(
        &mut self,
        actor: &ParticipantId,
        answer: OptionIndex,
    ) -> Result<Vec<Notification>, RoomError> {
        self.require_member(actor)?;

        let round = open_round(&mut self.phase)?;
        let target = round
            .suggestions
            .iter()
            .position(|s| s.answer == answer)
            .ok_or(RoomError::NoSuchSuggestion(answer.value()))?;
        if &round.suggestions[target].author == actor {
            return Err(RoomError::SelfVote);
        }

        let mut notifications = Vec::new();
        for (index, suggestion) in round.suggestions.iter_mut().enumerate() {
            if index != target && suggestion.remove_voter(actor) {
                notifications.push(Notification::everyone(RoomEvent::VoteUpdate {
                    answer: suggestion.answer,
                    votes: suggestion.votes(),
                }));
            }
        }

        let suggestion = &mut round.suggestions[target];
        suggestion.add_voter(actor.clone());
        notifications.push(Notification::everyone(RoomEvent::VoteUpdate {
            answer,
            votes: suggestion.votes(),
        }));

        Ok(notifications)
    }

    // ========================================
    // Relays
    // ========================================

    pub fn chat(
        &self,
        actor: &ParticipantId,
        text: ChatText,
        sent_at: Timestamp,
    ) -> Result<Vec<Notification>, RoomError> {
        let sender = self.member(actor)?;
        if self.phase == RoomPhase::Finished {
            return Err(RoomError::QuizFinished);
        }

        Ok(vec![Notification::everyone(RoomEvent::Chat(ChatMessage {
            sender_name: sender.name.clone(),
            text,
            timestamp: sent_at,
        }))])
    }

    /// Relay a stroke to everyone but the drawing connection
    pub fn draw(
        &self,
        actor: &ParticipantId,
        connection: ConnectionId,
        stroke: Stroke,
    ) -> Result<Vec<Notification>, RoomError> {
        self.require_member(actor)?;
        Ok(vec![Notification::everyone_except(
            connection,
            RoomEvent::WhiteboardDraw(stroke),
        )])
    }

    pub fn clear_whiteboard(&self, actor: &ParticipantId) -> Result<Vec<Notification>, RoomError> {
        self.require_member(actor)?;
        Ok(vec![Notification::everyone(RoomEvent::WhiteboardClear)])
    }

    // ========================================
    // Helpers
    // ========================================

    fn member(&self, participant: &ParticipantId) -> Result<&Participant, RoomError> {
        self.participants
            .iter()
            .find(|p| &p.id == participant)
            .ok_or(RoomError::NotInRoom)
    }

    fn require_member(&self, participant: &ParticipantId) -> Result<(), RoomError> {
        self.member(participant).map(|_| ())
    }

    fn require_host(&self, participant: &ParticipantId) -> Result<(), RoomError> {
        if self.host.as_ref() == Some(participant) {
            Ok(())
        } else {
            Err(RoomError::NotHost)
        }
    }

    fn quiz_finished(&self) -> Notification {
        Notification::everyone(RoomEvent::QuizFinished {
            group_score: self.group_score,
            total_questions: self.quiz.questions.len(),
        })
    }
}

fn open_round(phase: &mut RoomPhase) -> Result<&mut QuestionRound, RoomError> {
    match phase {
        RoomPhase::Waiting => Err(RoomError::NotStarted),
        RoomPhase::Finished => Err(RoomError::QuizFinished),
        RoomPhase::Playing(round) if !round.is_open() => Err(RoomError::QuestionClosed),
        RoomPhase::Playing(round) => Ok(round),
    }
}

fn question_view(question: &super::entity::Question) -> QuestionView {
    QuestionView {
        text: question.text.clone(),
        options: question.options.clone(),
    }
}

fn suggestion_view(suggestion: &Suggestion) -> SuggestionView {
    SuggestionView {
        author: PlayerSummary {
            id: suggestion.author.clone(),
            name: suggestion.author_name.clone(),
        },
        answer: suggestion.answer,
        votes: suggestion.votes(),
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;
    use crate::domain::{
        entity::Question,
        value_object::{DisplayName, QuizId},
    };

    /// Two questions with options A-D; the correct answers are 1 and 2.
    pub fn two_question_quiz() -> Quiz {
        let options = || {
            ["A", "B", "C", "D"]
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
        };
        Quiz {
            id: QuizId::new("Q1".to_string()).unwrap(),
            title: "Fixture quiz".to_string(),
            questions: vec![
                Question {
                    text: "First?".to_string(),
                    options: options(),
                    correct_answer: OptionIndex::new(1),
                },
                Question {
                    text: "Second?".to_string(),
                    options: options(),
                    correct_answer: OptionIndex::new(2),
                },
            ],
        }
    }

    pub fn identity(id: &str) -> Identity {
        Identity {
            id: ParticipantId::new(id.to_string()).unwrap(),
            display_name: DisplayName::new(id.to_uppercase()).unwrap(),
        }
    }

    pub fn room() -> RoomSession {
        RoomSession::new(
            RoomId::new("R1".to_string()).unwrap(),
            two_question_quiz(),
            None,
            Timestamp::new(0),
        )
    }
}
