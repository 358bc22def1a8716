//! Repository trait
//!
//! The persistence interface the domain needs. Implementations live in the
//! infrastructure layer.

use async_trait::async_trait;

use super::{RepositoryError, RoomId, RoomSession};

/// Room Repository trait
///
/// Rooms are loaded, mutated through [`RoomSession`] transitions and saved
/// back. Each room is only ever mutated by its own mailbox worker, so there
/// is no optimistic locking here.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Store a new room; fails if the id is taken
    async fn insert_room(&self, room: RoomSession) -> Result<(), RepositoryError>;

    async fn get_room(&self, room_id: &RoomId) -> Result<RoomSession, RepositoryError>;

    /// Replace an existing room
    async fn save_room(&self, room: RoomSession) -> Result<(), RepositoryError>;

    async fn remove_room(&self, room_id: &RoomId) -> Result<(), RepositoryError>;

    /// All rooms, ordered by id
    async fn list_rooms(&self) -> Vec<RoomSession>;
}
