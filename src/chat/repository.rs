use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::message::model::Message;
use crate::room;
use crate::user;

use super::model::RoomPreview;

/// Process-lifetime store of per-room message logs.
///
/// Owned explicitly and handed to the gateway by handle; nothing survives a
/// restart. Logs are append-only and unbounded, and the write lock is the
/// single point that serializes concurrent appends to a room.
pub struct HistoryRepository {
    rooms: RwLock<HashMap<room::Id, Vec<Message>>>,
}

impl HistoryRepository {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for HistoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryRepository {
    /// Appends in arrival order, creating the room log on first message.
    pub async fn append(&self, message: &Message) {
        self.rooms
            .write()
            .await
            .entry(message.room().clone())
            .or_default()
            .push(message.clone());
    }

    /// Full ordered log of a room; empty for rooms never written to.
    pub async fn history(&self, room: &room::Id) -> Vec<Message> {
        self.rooms
            .read()
            .await
            .get(room)
            .cloned()
            .unwrap_or_default()
    }

    /// Drops the room's log entirely. Deleting an absent room is a no-op.
    pub async fn delete(&self, room: &room::Id) {
        self.rooms.write().await.remove(room);
    }

    /// Rooms the user is a member of that hold at least one message, each
    /// paired with its latest message.
    pub async fn rooms_involving(&self, user: &user::Id) -> Vec<RoomPreview> {
        self.rooms
            .read()
            .await
            .iter()
            .filter(|(room, _)| room.involves(user))
            .filter_map(|(room, messages)| {
                messages
                    .last()
                    .map(|last| RoomPreview::new(room.clone(), last.clone()))
            })
            .collect()
    }
}
