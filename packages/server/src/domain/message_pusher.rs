//! MessagePusher trait
//!
//! Delivers room events to connected clients. The UI layer creates the
//! per-connection channel and registers it here; use cases only ever see
//! [`ConnectionId`]s.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomEvent};

/// Outbound channel of one connection, carrying encoded frames
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel);

    async fn unregister_client(&self, connection: &ConnectionId);

    /// Send one event to a single connection
    async fn push_to(
        &self,
        connection: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// Send one event to many connections.
    ///
    /// Unknown or closed connections are skipped; only an encoding failure is
    /// an error.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;
}
