//! Quiz room client: connection multiplexer, catalog cache, room view and CLI.

pub mod canvas;
pub mod catalog;
pub mod connection;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod room_view;
pub mod runner;
pub mod session;
pub mod transport;
mod ui;

pub use runner::{ClientConfig, run_client};
