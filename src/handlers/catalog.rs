use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Analytics, Faq, RoomView};
use crate::services::store::{FaqStore, RoomStore};
use crate::state::AppState;

const DEFAULT_FAQ_LIMIT: i64 = 10;
const DEFAULT_ANALYTICS_HOURS: i64 = 24;

// GET /api/rooms
#[derive(Deserialize)]
pub struct RoomsQuery {
    pub available_only: Option<bool>,
}

pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RoomsQuery>,
) -> Result<Response, AppError> {
    let rooms = state
        .store
        .list_rooms(params.available_only.unwrap_or(true))?;
    let views: Vec<RoomView<'_>> = rooms.iter().map(RoomView::from).collect();
    Ok(Json(views).into_response())
}

// GET /api/rooms/:room_type
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_type): Path<String>,
) -> Result<Response, AppError> {
    let room = state
        .store
        .find_room_by_type(&room_type)?
        .ok_or_else(|| AppError::NotFound(format!("no available {room_type} room")))?;
    Ok(Json(RoomView::from(&room)).into_response())
}

// GET /api/faqs
#[derive(Deserialize)]
pub struct FaqQuery {
    pub category: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_faqs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FaqQuery>,
) -> Result<Json<Vec<Faq>>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_FAQ_LIMIT).clamp(1, 100);
    let faqs = state.store.list_faqs(params.category.as_deref(), limit)?;
    Ok(Json(faqs))
}

// GET /api/analytics
#[derive(Deserialize)]
pub struct AnalyticsQuery {
    pub hours: Option<i64>,
}

pub async fn analytics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<Analytics>, AppError> {
    let hours = params.hours.unwrap_or(DEFAULT_ANALYTICS_HOURS).max(1);
    let analytics = state.store.analytics(hours, state.config.min_confidence)?;
    Ok(Json(analytics))
}
