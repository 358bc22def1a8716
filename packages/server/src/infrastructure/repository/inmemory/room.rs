//! In-memory room repository
//!
//! Stores [`RoomSession`] domain models directly in a `HashMap`. A database
//! backed implementation would need a row/DTO conversion layer in between.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, RoomId, RoomRepository, RoomSession};

#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<RoomId, RoomSession>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn insert_room(&self, room: RoomSession) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room.id) {
            return Err(RepositoryError::DuplicateRoom(room.id.to_string()));
        }
        rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<RoomSession, RepositoryError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))
    }

    async fn save_room(&self, room: RoomSession) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        match rooms.get_mut(&room.id) {
            Some(stored) => {
                *stored = room;
                Ok(())
            }
            None => Err(RepositoryError::RoomNotFound(room.id.to_string())),
        }
    }

    async fn remove_room(&self, room_id: &RoomId) -> Result<(), RepositoryError> {
        self.rooms
            .lock()
            .await
            .remove(room_id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))
    }

    async fn list_rooms(&self) -> Vec<RoomSession> {
        let rooms = self.rooms.lock().await;
        let mut list: Vec<RoomSession> = rooms.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        list
    }
}
