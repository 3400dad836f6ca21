use serde::{Deserialize, Serialize};

use crate::room;
use crate::user;

/// Per-room digest rendered in the conversation list. Client-local and
/// eventually consistent with the server's history; the unread flag exists
/// only here. Serialized as-is into local storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub room_id: room::Id,
    pub participant_id: user::Id,
    pub participant_name: String,
    pub last_message: String,
    pub time: i64,
    pub unread: bool,
}

/// The conversation currently opened in the room view: the peer's identity
/// plus the room both sides derive from the participant pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveChat {
    pub id: user::Id,
    pub username: String,
    pub room_id: room::Id,
}
