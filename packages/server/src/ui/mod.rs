//! Axum server: HTTP API and the websocket room endpoint.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
