//! MessagePusher implementations
//!
//! - `websocket`: per-connection unbounded channels feeding websocket writer tasks

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
