use crate::db::image::ImageRepository;
use crate::error::AppError;
use crate::models::image::normalize_user;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct ListRoomRequest {
    #[serde(default)]
    pub username: Option<String>,
}

/// POST /room/{room_id}: images of a room visible to `username`.
///
/// An empty body lists as `"all"`; a body that is present must be valid JSON.
pub async fn list_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request = parse_request(&body)?;
    let requester = normalize_user(request.username.as_deref());

    tracing::info!("Listing room '{}' for '{}'", room_id, requester);

    let images = ImageRepository::new(state.db_pool.clone())
        .list_visible(&room_id, &requester)
        .await?;

    if images.is_empty() {
        return Err(AppError::NotFound);
    }

    Ok(Json(json!({
        "success": true,
        "images": images,
    })))
}

fn parse_request(body: &[u8]) -> Result<ListRoomRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ListRoomRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::InvalidBody(e.to_string()))
}
