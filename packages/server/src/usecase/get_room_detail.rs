//! UseCase: look up one room

use std::sync::Arc;

use crate::domain::{RoomId, RoomRepository, RoomSession};

use super::error::GetRoomDetailError;

pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// `room_id` comes straight from the request path and is validated here.
    pub async fn execute(&self, room_id: String) -> Result<RoomSession, GetRoomDetailError> {
        let room_id = RoomId::new(room_id).map_err(|_| GetRoomDetailError::InvalidRoomId)?;
        self.repository
            .get_room(&room_id)
            .await
            .map_err(|_| GetRoomDetailError::RoomNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::room::test_fixtures::room, infrastructure::repository::InMemoryRoomRepository,
    };

    #[tokio::test]
    async fn test_get_room_detail() {
        // given:
        let repository = Arc::new(InMemoryRoomRepository::new());
        repository.insert_room(room()).await.unwrap();
        let usecase = GetRoomDetailUseCase::new(repository);

        // when / then:
        assert!(usecase.execute("R1".to_string()).await.is_ok());
        assert_eq!(
            usecase.execute("R2".to_string()).await,
            Err(GetRoomDetailError::RoomNotFound)
        );
        assert_eq!(
            usecase.execute("bad id".to_string()).await,
            Err(GetRoomDetailError::InvalidRoomId)
        );
    }
}
