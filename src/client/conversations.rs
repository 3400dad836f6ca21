use std::sync::Arc;

use log::{error, warn};

use crate::chat::model::RoomPreview;
use crate::message::model::Message;
use crate::room;
use crate::user;

use super::model::{ActiveChat, ConversationSummary};
use super::storage::Storage;

const STORAGE_PREFIX: &str = "conversations_";

/// Preview shown for a conversation the user opened but has not messaged in.
const NEW_CONVERSATION_PREVIEW: &str = "New conversation";

/// One user's conversation list, merged from the server's sync snapshot and
/// locally observed message traffic, persisted through the injected storage
/// after every mutation.
///
/// Invariant: at most one entry per room id. Every insertion path checks for
/// an existing entry first.
pub struct ConversationList {
    user: user::Id,
    entries: Vec<ConversationSummary>,
    storage: Arc<dyn Storage>,
}

impl ConversationList {
    /// Loads the persisted list for `user`. Missing or unreadable state
    /// degrades to an empty list; it is never an error.
    pub fn load(user: user::Id, storage: Arc<dyn Storage>) -> Self {
        let entries = storage
            .get(&storage_key(&user))
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    warn!("discarding unreadable conversation list for {user}: {e}");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            user,
            entries,
            storage,
        }
    }

    pub fn entries(&self) -> &[ConversationSummary] {
        &self.entries
    }

    pub fn get(&self, room: &room::Id) -> Option<&ConversationSummary> {
        self.entries.iter().find(|c| c.room_id == *room)
    }

    pub fn has_unread(&self) -> bool {
        self.entries.iter().any(|c| c.unread)
    }
}

impl ConversationList {
    /// Merges the server's baseline into the local list. Known rooms take
    /// the fresher last message but keep their local unread flag; unknown
    /// rooms are adopted as unread unless the local user spoke last, since a
    /// room this user started and never tracked is already known to them.
    pub fn apply_sync(&mut self, previews: &[RoomPreview]) {
        for preview in previews {
            let message = preview.last_message();
            match self.position(preview.room_id()) {
                Some(i) => {
                    let entry = &mut self.entries[i];
                    entry.last_message = message.text().to_owned();
                    entry.time = message.sent_at();
                }
                None => {
                    if *message.author_id() == self.user {
                        continue;
                    }
                    self.entries.push(ConversationSummary {
                        room_id: preview.room_id().clone(),
                        participant_id: message.author_id().clone(),
                        participant_name: message.author().to_owned(),
                        last_message: message.text().to_owned(),
                        time: message.sent_at(),
                        unread: true,
                    });
                }
            }
        }
        self.persist();
    }

    /// Records a message relayed by a peer. Read when its room is the one
    /// currently active and open, unread otherwise.
    pub fn observe_incoming(&mut self, message: &Message, active_room: Option<&room::Id>) {
        let unread = active_room != Some(message.room());
        match self.position(message.room()) {
            Some(i) => {
                let entry = &mut self.entries[i];
                entry.last_message = message.text().to_owned();
                entry.time = message.sent_at();
                entry.unread = unread;
            }
            None => self.entries.push(ConversationSummary {
                room_id: message.room().clone(),
                participant_id: message.author_id().clone(),
                participant_name: message.author().to_owned(),
                last_message: message.text().to_owned(),
                time: message.sent_at(),
                unread,
            }),
        }
        self.persist();
    }

    /// Records a message the local user just sent; always read. A new entry
    /// is named after the active chat's peer, not the message author.
    pub fn observe_sent(&mut self, message: &Message, chat: &ActiveChat) {
        match self.position(message.room()) {
            Some(i) => {
                let entry = &mut self.entries[i];
                entry.last_message = message.text().to_owned();
                entry.time = message.sent_at();
                entry.unread = false;
            }
            None => self.entries.push(ConversationSummary {
                room_id: message.room().clone(),
                participant_id: chat.id.clone(),
                participant_name: chat.username.clone(),
                last_message: message.text().to_owned(),
                time: message.sent_at(),
                unread: false,
            }),
        }
        self.persist();
    }

    /// Makes sure an opened chat shows up in the list: inserts a placeholder
    /// entry for a brand-new conversation, or clears the unread flag of a
    /// known one.
    pub fn track(&mut self, chat: &ActiveChat) {
        if self.get(&chat.room_id).is_some() {
            self.mark_read(&chat.room_id);
            return;
        }
        self.entries.push(ConversationSummary {
            room_id: chat.room_id.clone(),
            participant_id: chat.id.clone(),
            participant_name: chat.username.clone(),
            last_message: NEW_CONVERSATION_PREVIEW.to_owned(),
            time: chrono::Utc::now().timestamp(),
            unread: false,
        });
        self.persist();
    }

    pub fn mark_read(&mut self, room: &room::Id) {
        if let Some(i) = self.position(room) {
            self.entries[i].unread = false;
        }
        self.persist();
    }

    pub fn remove(&mut self, room: &room::Id) {
        self.entries.retain(|c| c.room_id != *room);
        self.persist();
    }
}

impl ConversationList {
    fn position(&self, room: &room::Id) -> Option<usize> {
        self.entries.iter().position(|c| c.room_id == *room)
    }

    fn persist(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(raw) => self.storage.set(&storage_key(&self.user), &raw),
            Err(e) => error!("failed to persist conversation list for {}: {e}", self.user),
        }
    }
}

fn storage_key(user: &user::Id) -> String {
    format!("{STORAGE_PREFIX}{user}")
}
