use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;

use crate::chat::service::ChatService;
use crate::message::model::Message;
use crate::room;
use crate::user;

use super::context::{ConnectionId, Ws};
use super::model::{Command, Event};

type Groups = HashMap<room::Id, HashMap<ConnectionId, UnboundedSender<Event>>>;

/// Dispatches client commands against the conversation store and relays
/// messages between the connections enrolled in a room.
#[derive(Clone)]
pub struct EventService {
    chat_service: Arc<ChatService>,
    groups: Arc<RwLock<Groups>>,
}

impl EventService {
    pub fn new(chat_service: Arc<ChatService>) -> Self {
        Self {
            chat_service,
            groups: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl EventService {
    pub async fn handle_command(&self, ctx: &Ws, command: Command) -> super::Result<()> {
        debug!("handling command from {}: {:?}", ctx.id(), command);
        match command {
            Command::RegisterUser { user_id } => self.register_user(ctx, user_id).await,
            Command::JoinRoom { room_id } => self.join_room(ctx, room_id).await,
            Command::SendMessage { message } => self.send_message(ctx, message).await,
            Command::DeleteConversation { room_id } => {
                self.chat_service.delete(&room_id).await;
                Ok(())
            }
        }
    }

    /// Unenrolls the connection from every broadcast group. Room histories
    /// outlive connections, so nothing else changes.
    pub async fn disconnect(&self, ctx: &Ws) {
        let mut groups = self.groups.write().await;
        for members in groups.values_mut() {
            members.remove(&ctx.id());
        }
        groups.retain(|_, members| !members.is_empty());
        debug!("{} dropped from broadcast groups", ctx.id());
    }
}

impl EventService {
    /// Binds the connection to an identity and answers with the rooms that
    /// identity is party to. A blank identity is ignored without a reply.
    async fn register_user(&self, ctx: &Ws, user_id: user::Id) -> super::Result<()> {
        if user_id.is_empty() {
            warn!("{} sent register_user without an id, ignoring", ctx.id());
            return Ok(());
        }

        ctx.bind_user(user_id.clone()).await;

        let conversations = self.chat_service.rooms_involving(&user_id).await;
        ctx.send(Event::SyncConversations { conversations })
    }

    /// Enrolls the connection in the room's broadcast group and replays the
    /// room's history, when there is any, to this connection only. Any
    /// connection may join any room id it knows; membership is a convention
    /// of the id derivation, not an enforced rule.
    async fn join_room(&self, ctx: &Ws, room_id: room::Id) -> super::Result<()> {
        let mut groups = self.groups.write().await;
        groups
            .entry(room_id.clone())
            .or_default()
            .insert(ctx.id(), ctx.sender());

        // Still under the group guard: a concurrent send lands either in
        // this snapshot or in the relay, never both, never neither.
        let history = self.chat_service.history(&room_id).await;
        if history.is_empty() {
            return Ok(());
        }
        ctx.send(Event::LoadHistory { messages: history })
    }

    /// Appends to the store, then relays to every other member of the room.
    /// The sender's client has already echoed the message locally and is
    /// deliberately excluded. The exclusive group guard spans append and
    /// fan-out, so every subscriber observes messages in store order.
    async fn send_message(&self, ctx: &Ws, message: Message) -> super::Result<()> {
        let mut groups = self.groups.write().await;
        self.chat_service.append(&message).await;

        if let Some(members) = groups.get_mut(message.room()) {
            members.retain(|member, sender| {
                if *member == ctx.id() {
                    return true;
                }
                let delivered = sender
                    .send(Event::ReceiveMessage {
                        message: message.clone(),
                    })
                    .is_ok();
                if !delivered {
                    debug!("pruning dead connection {member} from {}", message.room());
                }
                delivered
            });
        }
        Ok(())
    }
}
