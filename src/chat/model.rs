use serde::{Deserialize, Serialize};

use crate::message::model::Message;
use crate::room;

/// A room paired with its most recent message, as reported to a freshly
/// registered connection. Rooms with no messages are never previewed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPreview {
    room_id: room::Id,
    last_message_data: Message,
}

impl RoomPreview {
    pub fn new(room_id: room::Id, last_message_data: Message) -> Self {
        Self {
            room_id,
            last_message_data,
        }
    }

    pub const fn room_id(&self) -> &room::Id {
        &self.room_id
    }

    pub const fn last_message(&self) -> &Message {
        &self.last_message_data
    }
}
