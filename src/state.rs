use std::sync::Arc;

use axum::extract::FromRef;

use crate::chat::repository::HistoryRepository;
use crate::chat::service::ChatService;
use crate::event::service::EventService;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    pub event_service: EventService,
}

impl AppState {
    pub fn init() -> Self {
        let chat_service = Arc::new(ChatService::new(HistoryRepository::new()));

        Self {
            event_service: EventService::new(Arc::clone(&chat_service)),
            chat_service,
        }
    }
}
