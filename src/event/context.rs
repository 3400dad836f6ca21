use std::fmt::Display;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::{Notify, RwLock};
use uuid::Uuid;

use crate::user;

use super::model::Event;

/// Identifies one live connection for the lifetime of its socket. Room
/// broadcast groups key on it so the relay can exclude the sender.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Per-connection session state shared between the read and write tasks.
#[derive(Clone)]
pub struct Ws {
    id: ConnectionId,
    user: Arc<RwLock<Option<user::Id>>>,
    sender: UnboundedSender<Event>,
    pub close: Arc<Notify>,
}

impl Ws {
    pub fn new(sender: UnboundedSender<Event>) -> Self {
        Self {
            id: ConnectionId::random(),
            user: Arc::new(RwLock::new(None)),
            sender,
            close: Arc::new(Notify::new()),
        }
    }

    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    pub async fn bind_user(&self, user: user::Id) {
        *self.user.write().await = Some(user);
    }

    pub async fn user(&self) -> Option<user::Id> {
        self.user.read().await.clone()
    }

    /// Queues an event for the write task. Fails only once the connection is
    /// gone, which callers treat as a disconnect.
    pub fn send(&self, event: Event) -> super::Result<()> {
        self.sender.send(event).map_err(super::Error::from)
    }

    /// Handle for enrolling this connection in a room's broadcast group.
    pub fn sender(&self) -> UnboundedSender<Event> {
        self.sender.clone()
    }
}
