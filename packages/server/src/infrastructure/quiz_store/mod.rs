//! QuizStore implementations

mod inmemory;

pub use inmemory::{InMemoryQuizStore, QuestionRecord, QuizRecord};
