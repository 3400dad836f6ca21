use std::sync::Arc;

use log::warn;
use tokio::sync::mpsc::UnboundedSender;

use crate::event::model::{Command, Event};
use crate::message::model::Message;
use crate::room;
use crate::user::model::UserInfo;

use super::conversations::ConversationList;
use super::model::ActiveChat;
use super::storage::Storage;

/// Which pane of the chat widget is showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    List,
    Room,
}

/// State controller for one authenticated user's chat widget.
///
/// Lives exactly as long as the identity does: constructed at login (which
/// loads the persisted conversation list and registers with the gateway) and
/// dropped at logout, resetting the transient state to closed/list. Commands
/// flow out through the gateway channel handed in at construction; the
/// owning connection loop feeds server events back through `handle_event`.
pub struct ChatSession {
    user: UserInfo,
    open: bool,
    view: View,
    active: Option<ActiveChat>,
    messages: Vec<Message>,
    conversations: ConversationList,
    commands: UnboundedSender<Command>,
}

impl ChatSession {
    pub fn start(
        user: UserInfo,
        storage: Arc<dyn Storage>,
        commands: UnboundedSender<Command>,
    ) -> Self {
        let conversations = ConversationList::load(user.id.clone(), storage);
        let session = Self {
            user,
            open: false,
            view: View::List,
            active: None,
            messages: Vec::new(),
            conversations,
            commands,
        };
        session.command(Command::RegisterUser {
            user_id: session.user.id.clone(),
        });
        session
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub const fn view(&self) -> View {
        self.view
    }

    pub const fn active(&self) -> Option<&ActiveChat> {
        self.active.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub const fn conversations(&self) -> &ConversationList {
        &self.conversations
    }

    pub fn has_unread(&self) -> bool {
        self.conversations.has_unread()
    }
}

impl ChatSession {
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Opens a conversation with `target` (e.g. an item's reporter), deriving
    /// the room id from the two identities. The room shows up in the list
    /// immediately, before anything was said.
    pub fn open_chat(&mut self, target: &UserInfo) {
        let room_id = room::Id::between(&self.user.id, &target.id);
        let chat = ActiveChat {
            id: target.id.clone(),
            username: target.username.clone(),
            room_id,
        };
        self.conversations.track(&chat);
        self.enter_room(chat);
    }

    /// Opens a conversation picked from the list; peer metadata comes from
    /// the summary entry. Unknown room ids are ignored.
    pub fn select(&mut self, room_id: &room::Id) {
        let Some(summary) = self.conversations.get(room_id) else {
            return;
        };
        let chat = ActiveChat {
            id: summary.participant_id.clone(),
            username: summary.participant_name.clone(),
            room_id: room_id.clone(),
        };
        self.conversations.mark_read(room_id);
        self.enter_room(chat);
    }

    pub fn back_to_list(&mut self) {
        self.view = View::List;
        self.active = None;
    }

    /// Sends `text` to the active room. Blank input and list-view sends are
    /// no-ops. The message lands in the local buffer and list right away;
    /// the gateway relays only to the peer, never back to us.
    pub fn send(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(chat) = self.active.clone() else {
            return;
        };

        let message = Message::new(chat.room_id.clone(), &self.user, text);
        self.command(Command::SendMessage {
            message: message.clone(),
        });
        self.messages.push(message.clone());
        self.conversations.observe_sent(&message, &chat);
    }

    /// Deletes a conversation: drops the server-side history and the local
    /// entry, and falls back to the list view when the active room went away.
    pub fn delete_conversation(&mut self, room_id: &room::Id) {
        self.command(Command::DeleteConversation {
            room_id: room_id.clone(),
        });
        self.conversations.remove(room_id);
        if self.active.as_ref().is_some_and(|c| c.room_id == *room_id) {
            self.back_to_list();
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::SyncConversations { conversations } => {
                self.conversations.apply_sync(&conversations);
            }
            Event::LoadHistory { messages } => self.messages = messages,
            Event::ReceiveMessage { message } => {
                // The buffer only ever holds the joined room; everything else
                // is recovered from history on the next join.
                if self.active.as_ref().is_some_and(|c| c.room_id == *message.room()) {
                    self.messages.push(message.clone());
                }
                let active_room = self
                    .active
                    .as_ref()
                    .filter(|_| self.open)
                    .map(|c| c.room_id.clone());
                self.conversations
                    .observe_incoming(&message, active_room.as_ref());
            }
        }
    }
}

impl ChatSession {
    fn enter_room(&mut self, chat: ActiveChat) {
        self.messages.clear();
        self.open = true;
        self.view = View::Room;
        self.command(Command::JoinRoom {
            room_id: chat.room_id.clone(),
        });
        self.active = Some(chat);
    }

    /// The gateway channel going away mid-session is a disconnect, not an
    /// application error; the command is dropped and history catches the
    /// peer up later.
    fn command(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("gateway channel closed, dropping command");
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use crate::client::storage::MemoryStorage;
    use crate::user;

    use super::*;

    fn me() -> UserInfo {
        UserInfo::new("me", "Me")
    }

    fn peer() -> UserInfo {
        UserInfo::new("peer", "Peer")
    }

    fn session() -> (ChatSession, UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = ChatSession::start(me(), Arc::new(MemoryStorage::new()), tx);
        (session, rx)
    }

    #[test]
    fn starts_closed_on_list_view_and_registers() {
        let (session, mut commands) = session();

        assert!(!session.is_open());
        assert_eq!(session.view(), View::List);
        assert!(session.active().is_none());
        assert_eq!(
            commands.try_recv(),
            Ok(Command::RegisterUser {
                user_id: user::Id("me".into())
            })
        );
    }

    #[test]
    fn toggle_preserves_the_current_view() {
        let (mut session, _commands) = session();

        session.open_chat(&peer());
        session.toggle();
        assert!(!session.is_open());
        assert_eq!(session.view(), View::Room);

        session.toggle();
        assert!(session.is_open());
        assert_eq!(session.view(), View::Room);
    }

    #[test]
    fn open_chat_joins_the_derived_room() {
        let (mut session, mut commands) = session();
        commands.try_recv().unwrap(); // register_user

        session.open_chat(&peer());

        let expected = room::Id::between(&me().id, &peer().id);
        assert!(session.is_open());
        assert_eq!(session.view(), View::Room);
        assert_eq!(session.active().unwrap().room_id, expected);
        assert_eq!(
            commands.try_recv(),
            Ok(Command::JoinRoom { room_id: expected })
        );
        assert_eq!(session.conversations().entries().len(), 1);
    }

    #[test]
    fn send_is_a_no_op_without_text_or_room() {
        let (mut session, mut commands) = session();
        commands.try_recv().unwrap(); // register_user

        session.send("no room yet");
        session.open_chat(&peer());
        commands.try_recv().unwrap(); // join_room
        session.send("   \t ");

        assert!(commands.try_recv().is_err());
        assert!(session.messages().is_empty());
    }

    #[test]
    fn send_echoes_locally_and_emits_the_command() {
        let (mut session, mut commands) = session();
        commands.try_recv().unwrap(); // register_user
        session.open_chat(&peer());
        commands.try_recv().unwrap(); // join_room

        session.send("hello");

        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].text(), "hello");
        match commands.try_recv() {
            Ok(Command::SendMessage { message }) => assert_eq!(message.text(), "hello"),
            other => panic!("expected send_message, got {other:?}"),
        }
        let entry = &session.conversations().entries()[0];
        assert_eq!(entry.last_message, "hello");
        assert!(!entry.unread);
    }

    #[test]
    fn incoming_message_for_active_room_lands_in_buffer_as_read() {
        let (mut session, _commands) = session();
        session.open_chat(&peer());
        let room = session.active().unwrap().room_id.clone();

        session.handle_event(Event::ReceiveMessage {
            message: Message::new(room, &peer(), "hi there"),
        });

        assert_eq!(session.messages().len(), 1);
        assert!(!session.conversations().entries()[0].unread);
    }

    #[test]
    fn incoming_message_for_other_room_stays_out_of_buffer_and_unreads() {
        let (mut session, _commands) = session();
        session.open_chat(&peer());

        let elsewhere = room::Id::between(&me().id, &user::Id("other".into()));
        session.handle_event(Event::ReceiveMessage {
            message: Message::new(elsewhere.clone(), &UserInfo::new("other", "Other"), "psst"),
        });

        assert!(session.messages().is_empty());
        let entry = session.conversations().get(&elsewhere).unwrap();
        assert!(entry.unread);
    }

    #[test]
    fn incoming_while_closed_is_unread_even_for_the_active_room() {
        let (mut session, _commands) = session();
        session.open_chat(&peer());
        let room = session.active().unwrap().room_id.clone();
        session.toggle(); // widget closed, room still active

        session.handle_event(Event::ReceiveMessage {
            message: Message::new(room.clone(), &peer(), "while away"),
        });

        assert!(session.conversations().get(&room).unwrap().unread);
    }

    #[test]
    fn load_history_replaces_the_buffer_wholesale() {
        let (mut session, _commands) = session();
        session.open_chat(&peer());
        session.send("optimistic");
        let room = session.active().unwrap().room_id.clone();

        let history = vec![
            Message::new(room.clone(), &peer(), "one"),
            Message::new(room, &me(), "two"),
        ];
        session.handle_event(Event::LoadHistory {
            messages: history.clone(),
        });

        assert_eq!(session.messages(), history.as_slice());
    }

    #[test]
    fn select_reopens_from_a_summary_entry() {
        let (mut session, mut commands) = session();
        commands.try_recv().unwrap(); // register_user
        let room = room::Id::between(&me().id, &peer().id);
        session.handle_event(Event::ReceiveMessage {
            message: Message::new(room.clone(), &peer(), "hello"),
        });
        assert!(session.conversations().get(&room).unwrap().unread);

        session.select(&room);

        assert_eq!(session.view(), View::Room);
        assert_eq!(session.active().unwrap().username, "Peer");
        assert!(!session.conversations().get(&room).unwrap().unread);
        assert_eq!(
            commands.try_recv(),
            Ok(Command::JoinRoom { room_id: room })
        );
    }

    #[test]
    fn back_to_list_clears_the_active_room() {
        let (mut session, _commands) = session();
        session.open_chat(&peer());

        session.back_to_list();

        assert_eq!(session.view(), View::List);
        assert!(session.active().is_none());
    }

    #[test]
    fn deleting_the_active_conversation_closes_the_room_view() {
        let (mut session, mut commands) = session();
        commands.try_recv().unwrap(); // register_user
        session.open_chat(&peer());
        commands.try_recv().unwrap(); // join_room
        let room = session.active().unwrap().room_id.clone();

        session.delete_conversation(&room);

        assert_eq!(session.view(), View::List);
        assert!(session.active().is_none());
        assert!(session.conversations().entries().is_empty());
        assert_eq!(
            commands.try_recv(),
            Ok(Command::DeleteConversation { room_id: room })
        );
    }
}
