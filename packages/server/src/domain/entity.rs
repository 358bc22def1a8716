//! Entities of the room domain.

use serde::{Deserialize, Serialize};

use super::{
    error::ValueObjectError,
    value_object::{ChatText, ConnectionId, DisplayName, OptionIndex, ParticipantId, QuizId, Timestamp},
};

/// A question of a quiz, including its answer key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: OptionIndex,
}

impl Question {
    pub fn has_option(&self, answer: OptionIndex) -> bool {
        answer.value() < self.options.len()
    }
}

/// A quiz as provided by the quiz store (read-only for rooms)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    pub questions: Vec<Question>,
}

impl Quiz {
    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            question_count: self.questions.len(),
        }
    }
}

/// Catalog entry of a quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: QuizId,
    pub title: String,
    pub question_count: usize,
}

/// Authenticated user behind a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: ParticipantId,
    pub display_name: DisplayName,
}

/// One connected user within a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: DisplayName,
    pub connection: ConnectionId,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(identity: Identity, connection: ConnectionId, joined_at: Timestamp) -> Self {
        Self {
            id: identity.id,
            name: identity.display_name,
            connection,
            joined_at,
        }
    }
}

/// A proposed answer to the current question.
///
/// Voters are kept in insertion order and are unique, so the vote count is
/// simply the number of voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub author: ParticipantId,
    pub author_name: DisplayName,
    pub answer: OptionIndex,
    pub voters: Vec<ParticipantId>,
    pub submitted_at: Timestamp,
}

impl Suggestion {
    pub fn new(
        author: ParticipantId,
        author_name: DisplayName,
        answer: OptionIndex,
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            author,
            author_name,
            answer,
            voters: Vec::new(),
            submitted_at,
        }
    }

    pub fn votes(&self) -> usize {
        self.voters.len()
    }

    pub fn has_voter(&self, voter: &ParticipantId) -> bool {
        self.voters.contains(voter)
    }

    /// Returns `false` when the voter was already counted.
    pub fn add_voter(&mut self, voter: ParticipantId) -> bool {
        if self.has_voter(&voter) {
            return false;
        }
        self.voters.push(voter);
        true
    }

    /// Returns `true` when the voter was counted before.
    pub fn remove_voter(&mut self, voter: &ParticipantId) -> bool {
        let before = self.voters.len();
        self.voters.retain(|v| v != voter);
        before != self.voters.len()
    }
}

const MAX_BRUSH_SIZE: f64 = 200.0;
const MAX_COLOR_LENGTH: usize = 32;

/// One whiteboard line segment; relayed, never stored
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: String,
    pub brush_size: f64,
    pub is_erasing: bool,
}

impl Stroke {
    pub fn new(
        (x0, y0): (f64, f64),
        (x1, y1): (f64, f64),
        color: String,
        brush_size: f64,
        is_erasing: bool,
    ) -> Result<Self, ValueObjectError> {
        if ![x0, y0, x1, y1].iter().all(|c| c.is_finite()) {
            return Err(ValueObjectError::InvalidStroke("coordinates must be finite"));
        }
        if !(brush_size.is_finite() && brush_size > 0.0 && brush_size <= MAX_BRUSH_SIZE) {
            return Err(ValueObjectError::InvalidStroke(
                "brush size must be in (0, 200]",
            ));
        }
        if color.trim().is_empty() || color.len() > MAX_COLOR_LENGTH {
            return Err(ValueObjectError::InvalidStroke(
                "color must be 1 to 32 characters",
            ));
        }
        Ok(Self {
            x0,
            y0,
            x1,
            y1,
            color,
            brush_size,
            is_erasing,
        })
    }
}

/// Chat message relayed to a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub sender_name: DisplayName,
    pub text: ChatText,
    pub timestamp: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant_id(value: &str) -> ParticipantId {
        ParticipantId::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_suggestion_voters_are_unique() {
        // given:
        let mut suggestion = Suggestion::new(
            participant_id("p1"),
            DisplayName::new("P1".to_string()).unwrap(),
            OptionIndex::new(1),
            Timestamp::new(0),
        );

        // when:
        let first = suggestion.add_voter(participant_id("p2"));
        let second = suggestion.add_voter(participant_id("p2"));

        // then:
        assert!(first);
        assert!(!second);
        assert_eq!(suggestion.votes(), 1);
    }

    #[test]
    fn test_suggestion_remove_voter() {
        // given:
        let mut suggestion = Suggestion::new(
            participant_id("p1"),
            DisplayName::new("P1".to_string()).unwrap(),
            OptionIndex::new(0),
            Timestamp::new(0),
        );
        suggestion.add_voter(participant_id("p2"));

        // when / then:
        assert!(suggestion.remove_voter(&participant_id("p2")));
        assert!(!suggestion.remove_voter(&participant_id("p2")));
        assert_eq!(suggestion.votes(), 0);
    }

    #[test]
    fn test_stroke_validation() {
        let ok = Stroke::new((0.0, 0.0), (10.0, 5.0), "#000000".to_string(), 4.0, false);
        assert!(ok.is_ok());

        let nan = Stroke::new((f64::NAN, 0.0), (1.0, 1.0), "#000".to_string(), 4.0, false);
        assert!(nan.is_err());

        let huge = Stroke::new((0.0, 0.0), (1.0, 1.0), "#000".to_string(), 500.0, true);
        assert!(huge.is_err());

        let no_color = Stroke::new((0.0, 0.0), (1.0, 1.0), "".to_string(), 2.0, false);
        assert!(no_color.is_err());
    }

    #[test]
    fn test_quiz_summary_counts_questions() {
        // given:
        let quiz = Quiz {
            id: QuizId::new("q1".to_string()).unwrap(),
            title: "Capitals".to_string(),
            questions: vec![Question {
                text: "Capital of France?".to_string(),
                options: vec!["Paris".to_string(), "Lyon".to_string()],
                correct_answer: OptionIndex::new(0),
            }],
        };

        // when:
        let summary = quiz.summary();

        // then:
        assert_eq!(summary.question_count, 1);
        assert_eq!(summary.title, "Capitals");
    }
}
