use serde::{Deserialize, Serialize};

use crate::room;
use crate::user;
use crate::user::model::UserInfo;

/// A single chat message, immutable once created.
///
/// Built by the sender's client, appended to the room history and echoed to
/// the recipient; never mutated or deleted individually (only whole-room
/// deletion exists). Field renames pin the wire format the clients speak.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    room: room::Id,
    author: String,
    #[serde(rename = "authorId")]
    author_id: user::Id,
    #[serde(rename = "message")]
    text: String,
    #[serde(rename = "time")]
    sent_at: i64,
}

impl Message {
    pub fn new(room: room::Id, author: &UserInfo, text: impl Into<String>) -> Self {
        Self {
            room,
            author: author.username.clone(),
            author_id: author.id.clone(),
            text: text.into(),
            sent_at: chrono::Utc::now().timestamp(),
        }
    }

    pub const fn room(&self) -> &room::Id {
        &self.room
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub const fn author_id(&self) -> &user::Id {
        &self.author_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn sent_at(&self) -> i64 {
        self.sent_at
    }
}
