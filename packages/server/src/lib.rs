//! Collaborative quiz room server.
//!
//! Participants connect over a websocket, join a room and play through a quiz
//! together: the host presents questions, everyone suggests and votes on
//! answers, and the room keeps a shared score. Chat and a shared whiteboard
//! are relayed alongside.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
