use axum::Router;
use axum::routing::get;
use log::info;
use tower_http::cors::{Any, CorsLayer};

use reclaim_chat::config::Config;
use reclaim_chat::event;
use reclaim_chat::state::AppState;

#[tokio::main]
async fn main() {
    let config = Config::default();
    let state = AppState::init();

    let app = Router::new()
        .route("/health", get(health))
        .merge(event::endpoints(state))
        .layer(
            CorsLayer::new()
                .allow_origin(config.env.allow_origin())
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = config.env.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    info!("server running on {addr}");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}

async fn health() -> &'static str {
    "OK"
}
