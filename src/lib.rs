pub mod chat;
pub mod client;
pub mod config;
pub mod event;
pub mod message;
pub mod room;
pub mod state;
pub mod user;
