use serde::{Deserialize, Serialize};

use crate::chat::model::RoomPreview;
use crate::message::model::Message;
use crate::room;
use crate::user;

/// Client-to-server events, one inbound channel per connection. The tag
/// doubles as the event name on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    RegisterUser {
        #[serde(rename = "userId")]
        user_id: user::Id,
    },
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: room::Id,
    },
    SendMessage {
        message: Message,
    },
    DeleteConversation {
        #[serde(rename = "roomId")]
        room_id: room::Id,
    },
}

/// Server-to-client events, delivered over a connection's outbound channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SyncConversations { conversations: Vec<RoomPreview> },
    LoadHistory { messages: Vec<Message> },
    ReceiveMessage { message: Message },
}
