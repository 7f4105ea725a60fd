pub mod config;

use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use parley_api::auth::{self, AppState};
use parley_api::chats;
use parley_gateway::connection;

/// Assemble the application router: JSON API, WebSocket gateway, and the
/// static browser client for everything else.
pub fn app(state: AppState, static_dir: &str) -> Router {
    let api = Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/chats", get(chats::list_chats))
        .route("/api/chats", post(chats::create_chat))
        .route("/api/chats/{room}", get(chats::list_room_chats))
        .route("/gateway", get(ws_upgrade))
        .with_state(state);

    Router::new()
        .merge(api)
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        connection::handle_connection(socket, state.dispatcher.clone(), state.db.clone())
    })
}
