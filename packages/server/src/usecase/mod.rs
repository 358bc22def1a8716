//! UseCase layer
//!
//! One struct per use case. Each holds the domain interfaces it needs as
//! `Arc<dyn Trait>` and exposes an `execute` method.

pub mod authenticate;
pub mod connect_participant;
pub mod create_room;
pub mod disconnect_participant;
pub mod error;
pub mod get_room_detail;
pub mod get_rooms;
pub mod handle_room_command;
pub mod list_quizzes;
pub mod room_mailbox;

pub use authenticate::AuthenticateUseCase;
pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, CreateRoomError, GetRoomDetailError, ListQuizzesError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use handle_room_command::{HandleRoomCommandUseCase, RoomLifecycle};
pub use list_quizzes::ListQuizzesUseCase;
pub use room_mailbox::RoomMailbox;
