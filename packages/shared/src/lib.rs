//! Utilities shared by the Quizroom server and client.

pub mod logger;
pub mod time;
