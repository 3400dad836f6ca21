use std::sync::Arc;

use log::{debug, info};

use crate::message::model::Message;
use crate::room;
use crate::user;

use super::model::RoomPreview;
use super::repository::HistoryRepository;

/// Authoritative view over the room histories. All gateway access to stored
/// messages funnels through here.
#[derive(Clone)]
pub struct ChatService {
    repository: Arc<HistoryRepository>,
}

impl ChatService {
    pub fn new(repository: HistoryRepository) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }
}

impl ChatService {
    pub async fn append(&self, message: &Message) {
        debug!("appending message to room {}", message.room());
        self.repository.append(message).await;
    }

    pub async fn history(&self, room: &room::Id) -> Vec<Message> {
        self.repository.history(room).await
    }

    pub async fn delete(&self, room: &room::Id) {
        info!("deleting conversation {room}");
        self.repository.delete(room).await;
    }

    pub async fn rooms_involving(&self, user: &user::Id) -> Vec<RoomPreview> {
        self.repository.rooms_involving(user).await
    }
}
