//! Commands a participant can issue within a room.

use super::{
    entity::{Identity, Stroke},
    value_object::{ChatText, ConnectionId, OptionIndex, RoomId},
};

/// Who issued a command: the authenticated identity and the connection it
/// arrived on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub identity: Identity,
    pub connection: ConnectionId,
}

impl Actor {
    pub fn new(identity: Identity, connection: ConnectionId) -> Self {
        Self {
            identity,
            connection,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomCommand {
    Join,
    Leave,
    /// Host only
    NextQuestion,
    /// Host only
    ResolveQuestion,
    Suggest(OptionIndex),
    Vote(OptionIndex),
    Chat(ChatText),
    Draw(Stroke),
    ClearWhiteboard,
}

impl RoomCommand {
    /// Whether applying the command can change the stored room
    pub fn mutates_room(&self) -> bool {
        !matches!(
            self,
            RoomCommand::Chat(_) | RoomCommand::Draw(_) | RoomCommand::ClearWhiteboard
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoomCommand::Join => "join_room",
            RoomCommand::Leave => "leave_room",
            RoomCommand::NextQuestion => "next_question",
            RoomCommand::ResolveQuestion => "resolve_question",
            RoomCommand::Suggest(_) => "suggest_answer",
            RoomCommand::Vote(_) => "vote_answer",
            RoomCommand::Chat(_) => "chat_message",
            RoomCommand::Draw(_) => "whiteboard_draw",
            RoomCommand::ClearWhiteboard => "whiteboard_clear",
        }
    }
}

/// A decoded client frame: either joining a room or a command for the room
/// the connection is currently in.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientRequest {
    JoinRoom(RoomId),
    InRoom(RoomCommand),
}
