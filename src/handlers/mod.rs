pub mod catalog;
pub mod chat;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/chat", post(chat::chat))
        .route("/api/voice", post(chat::voice))
        .route("/api/analyze", post(chat::analyze))
        .route("/api/rooms", get(catalog::list_rooms))
        .route("/api/rooms/:room_type", get(catalog::get_room))
        .route("/api/faqs", get(catalog::list_faqs))
        .route("/api/analytics", get(catalog::analytics))
        .with_state(state)
}
