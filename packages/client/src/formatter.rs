//! Message formatting utilities for terminal display.
//!
//! Answer options are shown one-based; the wire protocol is zero-based.

use quizroom_server::infrastructure::dto::websocket::{
    PlayerDto, QuestionDto, QuizSummaryDto, RoomStateDto, ServerEvent, StrokeDto, SuggestionDto,
};
use quizroom_shared::time::timestamp_to_clock_time;

use crate::room_view::RoomView;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format any server event.
    ///
    /// # Arguments
    ///
    /// * `event` - The event received from the server
    ///
    /// # Returns
    ///
    /// A formatted string ready to print
    pub fn format_event(event: &ServerEvent) -> String {
        match event {
            ServerEvent::RoomJoined { room } => Self::format_room_joined(room),
            ServerEvent::PlayerJoined { players } => Self::format_players("joined", players),
            ServerEvent::PlayerLeft { players } => Self::format_players("left", players),
            ServerEvent::NewQuestion {
                question,
                question_number,
            } => Self::format_question(question, *question_number),
            ServerEvent::NewSuggestion { suggestion } => Self::format_suggestion(suggestion),
            ServerEvent::VoteUpdate { answer, votes } => {
                format!("\n* option {} now has {} vote(s)\n", answer + 1, votes)
            }
            ServerEvent::QuestionResult {
                winning_answer,
                correct_answer,
                is_correct,
                group_score,
            } => Self::format_result(*winning_answer, *correct_answer, *is_correct, *group_score),
            ServerEvent::QuizFinished {
                group_score,
                total_questions,
            } => format!(
                "\n{}\nQuiz finished! Group score: {}/{}\n{}\n",
                RULE, group_score, total_questions, RULE
            ),
            ServerEvent::ChatMessage {
                player_name,
                message,
                timestamp,
            } => Self::format_chat_message(player_name, message, *timestamp),
            ServerEvent::WhiteboardDraw(stroke) => Self::format_stroke(stroke),
            ServerEvent::WhiteboardClear {} => "\n~ whiteboard cleared\n".to_string(),
            ServerEvent::Error { message } => format!("\n! {}\n", message),
        }
    }

    /// Format the room snapshot received after joining
    pub fn format_room_joined(room: &RoomStateDto) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n\n{}\n", RULE));
        output.push_str(&format!(
            "Room {} - {} ({} questions)\n",
            room.room_id, room.quiz.title, room.quiz.question_count
        ));
        output.push_str(&format!("Group score: {}\n", room.group_score));
        output.push_str("Players:\n");

        if room.players.is_empty() {
            output.push_str("(No players)\n");
        } else {
            for player in &room.players {
                let is_host = room.host.as_deref() == Some(player.id.as_str());
                let host_suffix = if is_host { " (host)" } else { "" };
                output.push_str(&format!("{} [{}]{}\n", player.name, player.id, host_suffix));
            }
        }

        output.push_str(&format!("{}\n", RULE));

        if let (Some(question), Some(number)) = (&room.question, room.question_number) {
            output.push_str(&Self::format_question(question, number));
            for suggestion in &room.suggestions {
                output.push_str(&format!(
                    "  {} suggested option {} ({} vote(s))\n",
                    suggestion.participant.name,
                    suggestion.answer + 1,
                    suggestion.votes
                ));
            }
        }

        output
    }

    fn format_players(verb: &str, players: &[PlayerDto]) -> String {
        let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        format!(
            "\n{} a player {}. Now here: {}\n",
            if verb == "joined" { "+" } else { "-" },
            verb,
            names.join(", ")
        )
    }

    /// Format a question with one-based option numbers
    pub fn format_question(question: &QuestionDto, number: usize) -> String {
        let mut output = format!("\n{}\nQuestion {}: {}\n", THIN_RULE, number, question.text);
        for (index, option) in question.options.iter().enumerate() {
            output.push_str(&format!("  {}) {}\n", index + 1, option));
        }
        output.push_str(&format!("{}\n", THIN_RULE));
        output
    }

    fn format_suggestion(suggestion: &SuggestionDto) -> String {
        format!(
            "\n? {} suggests option {}\n",
            suggestion.participant.name,
            suggestion.answer + 1
        )
    }

    fn format_result(
        winning_answer: Option<usize>,
        correct_answer: usize,
        is_correct: bool,
        group_score: u32,
    ) -> String {
        let chosen = match winning_answer {
            Some(answer) => format!("option {}", answer + 1),
            None => "nothing".to_string(),
        };
        let verdict = if is_correct { "Correct!" } else { "Wrong." };
        format!(
            "\n= The group chose {}. {} The answer was option {}. Group score: {}\n",
            chosen,
            verdict,
            correct_answer + 1,
            group_score
        )
    }

    /// Format a chat message
    ///
    /// # Arguments
    ///
    /// * `from` - Display name of the sender
    /// * `content` - The message content
    /// * `sent_at` - Unix timestamp of the message (milliseconds)
    pub fn format_chat_message(from: &str, content: &str, sent_at: i64) -> String {
        format!(
            "\n[{}] @{}: {}\n",
            timestamp_to_clock_time(sent_at),
            from,
            content
        )
    }

    fn format_stroke(stroke: &StrokeDto) -> String {
        let action = if stroke.is_erasing { "erased" } else { "drew" };
        format!(
            "\n~ someone {} ({}, {}) -> ({}, {})\n",
            action, stroke.x0, stroke.y0, stroke.x1, stroke.y1
        )
    }

    /// Format the local view of the current room plus the whiteboard size
    pub fn format_status(view: &RoomView, strokes: usize) -> String {
        let Some(room_id) = &view.room_id else {
            return format!("\nNot in a room. Whiteboard: {} stroke(s)\n", strokes);
        };

        let mut output = format!("\n{}\nRoom {}", THIN_RULE, room_id);
        if let Some(quiz) = &view.quiz {
            output.push_str(&format!(" - {}", quiz.title));
        }
        output.push('\n');

        let state = if view.finished {
            "finished".to_string()
        } else {
            match view.question_number {
                Some(number) => format!("question {}", number),
                None => "waiting to start".to_string(),
            }
        };
        output.push_str(&format!(
            "State: {}, group score: {}\n",
            state, view.group_score
        ));
        output.push_str(&format!("Players: {}\n", view.players.len()));

        for suggestion in &view.suggestions {
            let mut marks = String::new();
            if view.my_suggestion == Some(suggestion.answer) {
                marks.push_str(" (yours)");
            }
            if view.my_vote == Some(suggestion.answer) {
                marks.push_str(" (your vote)");
            }
            output.push_str(&format!(
                "  option {}: {} vote(s){}\n",
                suggestion.answer + 1,
                suggestion.votes,
                marks
            ));
        }

        output.push_str(&format!("Whiteboard: {} stroke(s)\n{}\n", strokes, THIN_RULE));
        output
    }

    /// Format the quiz catalog
    pub fn format_catalog(quizzes: &[QuizSummaryDto]) -> String {
        if quizzes.is_empty() {
            return "\n(No quizzes available)\n".to_string();
        }

        let mut output = format!("\n{}\nQuizzes:\n", RULE);
        for quiz in quizzes {
            output.push_str(&format!(
                "{} - {} ({} questions)\n",
                quiz.id, quiz.title, quiz.question_count
            ));
        }
        output.push_str(&format!("{}\n", RULE));
        output
    }

    pub fn format_help() -> String {
        [
            "",
            "Commands:",
            "  /quizzes                    list available quizzes",
            "  /status                     show the current room and your choices",
            "  /join <room>                join a room (leaves the current one)",
            "  /leave                      leave the current room",
            "  /next                       next question (host)",
            "  /resolve                    resolve the current question (host)",
            "  /suggest <n>                suggest answer option n",
            "  /vote <n>                   vote for the suggestion of option n",
            "  /draw x0 y0 x1 y1 [color] [size]",
            "  /erase x0 y0 x1 y1 [size]",
            "  /clear                      clear the whiteboard",
            "  /help                       show this help",
            "  /quit                       exit",
            "  anything else is sent as chat",
            "",
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use quizroom_server::infrastructure::dto::websocket::{RoomStatusDto, SuggestionStateDto};

    use super::*;

    fn player(id: &str, name: &str) -> PlayerDto {
        PlayerDto {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_format_room_joined_marks_host() {
        // given:
        let room = RoomStateDto {
            room_id: "R1".to_string(),
            quiz: QuizSummaryDto {
                id: "Q1".to_string(),
                title: "Capitals".to_string(),
                question_count: 2,
            },
            players: vec![player("p1", "Alice"), player("p2", "Bob")],
            group_score: 0,
            status: RoomStatusDto::Waiting,
            host: Some("p1".to_string()),
            question: None,
            question_number: None,
            suggestions: vec![],
        };

        // when:
        let result = MessageFormatter::format_room_joined(&room);

        // then:
        assert!(result.contains("Room R1 - Capitals (2 questions)"));
        assert!(result.contains("Alice [p1] (host)"));
        assert!(result.contains("Bob [p2]\n"));
        assert!(result.contains(RULE));
    }

    #[test]
    fn test_format_question_is_one_based() {
        // given:
        let question = QuestionDto {
            text: "Capital of France?".to_string(),
            options: vec!["Lyon".to_string(), "Paris".to_string()],
        };

        // when:
        let result = MessageFormatter::format_question(&question, 1);

        // then:
        assert!(result.contains("Question 1: Capital of France?"));
        assert!(result.contains("  1) Lyon"));
        assert!(result.contains("  2) Paris"));
    }

    #[test]
    fn test_format_result() {
        // given:
        let event = ServerEvent::QuestionResult {
            winning_answer: None,
            correct_answer: 1,
            is_correct: false,
            group_score: 0,
        };

        // when:
        let result = MessageFormatter::format_event(&event);

        // then:
        assert!(result.contains("chose nothing"));
        assert!(result.contains("Wrong."));
        assert!(result.contains("option 2"));
    }

    #[test]
    fn test_format_chat_message() {
        // given:
        let sent_at = 1672498800000;

        // when:
        let result = MessageFormatter::format_chat_message("Alice", "Hello, world!", sent_at);

        // then:
        assert!(result.contains("@Alice: Hello, world!"));
        assert!(result.contains("[15:00:00]"));
    }

    #[test]
    fn test_format_catalog() {
        // given:
        let quizzes = vec![QuizSummaryDto {
            id: "Q1".to_string(),
            title: "Capitals".to_string(),
            question_count: 2,
        }];

        // when / then:
        assert!(MessageFormatter::format_catalog(&quizzes).contains("Q1 - Capitals (2 questions)"));
        assert!(MessageFormatter::format_catalog(&[]).contains("No quizzes"));
    }

    #[test]
    fn test_format_status_marks_own_choices() {
        // given:
        let mut view = RoomView::new();
        view.room_id = Some("R1".to_string());
        view.question_number = Some(1);
        view.group_score = 1;
        view.suggestions = vec![
            SuggestionStateDto {
                participant: player("p1", "Alice"),
                answer: 0,
                votes: 0,
            },
            SuggestionStateDto {
                participant: player("p2", "Bob"),
                answer: 2,
                votes: 1,
            },
        ];
        view.my_suggestion = Some(0);
        view.my_vote = Some(2);

        // when:
        let result = MessageFormatter::format_status(&view, 3);

        // then:
        assert!(result.contains("Room R1"));
        assert!(result.contains("State: question 1, group score: 1"));
        assert!(result.contains("option 1: 0 vote(s) (yours)"));
        assert!(result.contains("option 3: 1 vote(s) (your vote)"));
        assert!(result.contains("Whiteboard: 3 stroke(s)"));
    }

    #[test]
    fn test_format_error() {
        let event = ServerEvent::Error {
            message: "Room is full".to_string(),
        };
        assert_eq!(MessageFormatter::format_event(&event), "\n! Room is full\n");
    }
}
