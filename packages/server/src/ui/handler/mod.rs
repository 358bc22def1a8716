mod http;
mod websocket;

pub use http::{create_room, get_room_detail, get_rooms, health_check, list_quizzes};
pub use websocket::websocket_handler;
