//! Infrastructure layer
//!
//! Concrete implementations of the domain interfaces plus the wire DTOs.

pub mod dto;
pub mod identity;
pub mod message_pusher;
pub mod quiz_store;
pub mod repository;
