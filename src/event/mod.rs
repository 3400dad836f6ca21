use axum::Router;
use axum::routing::get;

use crate::state::AppState;

pub mod context;
pub mod handler;
pub mod model;
pub mod service;

type Result<T> = std::result::Result<T, Error>;

pub fn endpoints<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/ws", get(handler::ws))
        .with_state(state)
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    _ParseJson(#[from] serde_json::Error),

    #[error(transparent)]
    _SendEvent(#[from] tokio::sync::mpsc::error::SendError<model::Event>),
}
