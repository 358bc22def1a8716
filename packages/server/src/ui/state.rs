//! Shared application state.

use std::sync::Arc;

use quizroom_shared::time::Clock;

use crate::{
    domain::{IdentityProvider, MessagePusher, QuizStore, RoomRepository},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    usecase::{
        AuthenticateUseCase, ConnectParticipantUseCase, CreateRoomUseCase,
        DisconnectParticipantUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        HandleRoomCommandUseCase, ListQuizzesUseCase, RoomMailbox,
    },
};

/// Use cases reachable from the handlers
pub struct AppState {
    pub authenticate_usecase: Arc<AuthenticateUseCase>,
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    pub room_mailbox: Arc<RoomMailbox>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub list_quizzes_usecase: Arc<ListQuizzesUseCase>,
}

impl AppState {
    /// Wire every use case on top of the in-memory room repository and the
    /// websocket pusher.
    ///
    /// Dependencies are created in order: repository, pusher, use cases.
    pub fn in_memory(
        quiz_store: Arc<dyn QuizStore>,
        identity_provider: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        room_capacity: usize,
    ) -> Self {
        let repository: Arc<dyn RoomRepository> = Arc::new(InMemoryRoomRepository::new());
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(WebSocketMessagePusher::new());

        let authenticate_usecase = Arc::new(AuthenticateUseCase::new(identity_provider));
        let handle_room_command = Arc::new(HandleRoomCommandUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            clock.clone(),
        ));
        let room_mailbox = Arc::new(RoomMailbox::new(
            handle_room_command,
            message_pusher.clone(),
        ));

        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                authenticate_usecase.clone(),
                message_pusher.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                room_mailbox.clone(),
                message_pusher,
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                quiz_store.clone(),
                repository.clone(),
                room_mailbox.clone(),
                clock,
                room_capacity,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository)),
            list_quizzes_usecase: Arc::new(ListQuizzesUseCase::new(quiz_store)),
            authenticate_usecase,
            room_mailbox,
        }
    }
}
