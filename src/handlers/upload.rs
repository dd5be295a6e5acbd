use crate::db::image::ImageRepository;
use crate::db::room::RoomRepository;
use crate::error::AppError;
use crate::models::Room;
use crate::storage::{object_key, StoredObject};
use crate::AppState;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// A file part read from the request, not yet stored
struct PendingFile {
    filename: Option<String>,
    content_type: String,
    data: Vec<u8>,
}

/// POST /upload: store every `images[]` part and register it under `roomId`.
///
/// Nothing is written to the database unless every file reached object
/// storage, and the response is only sent after all rows are committed.
pub async fn upload_images(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let mut room_name: Option<String> = None;
    let mut user: Option<String> = None;
    let mut files: Vec<PendingFile> = Vec::new();

    let body_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::TooLarge {
                max_size: state.max_request_bytes,
            }
        } else {
            AppError::Multipart(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(body_error)? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "images[]" | "images" => {
                let filename = field.file_name().map(String::from);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(body_error)?;

                if data.len() > state.max_upload_bytes {
                    return Err(AppError::TooLarge {
                        max_size: state.max_upload_bytes,
                    });
                }

                files.push(PendingFile {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
            "roomId" => room_name = Some(field.text().await.map_err(body_error)?),
            "user" => user = Some(field.text().await.map_err(body_error)?),
            _ => tracing::debug!("Ignoring multipart field '{}'", field_name),
        }
    }

    let room_name = room_name
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .ok_or(AppError::MissingRoomId)?;

    if files.is_empty() {
        return Err(AppError::NoFiles);
    }

    tracing::info!(
        "Uploading {} file(s) to room '{}' for '{}'",
        files.len(),
        room_name,
        user.as_deref().unwrap_or("all")
    );

    let stored = store_files(&state, &room_name, files).await?;

    let registered = register_files(&state, &room_name, &stored, user.as_deref()).await;
    let (room, count) = match registered {
        Ok(result) => result,
        Err(e) => {
            discard(&state, &stored).await;
            return Err(e);
        }
    };

    tracing::info!(
        "Registered {} image(s) in room '{}' (id {})",
        count,
        room.name,
        room.id
    );

    Ok(Json(json!({
        "success": true,
        "message": format!("{} image(s) uploaded successfully.", count),
        "fileInfo": stored,
    })))
}

/// Put every file into object storage under a key unique to this request.
///
/// If any upload fails, the objects already stored are removed again.
async fn store_files(
    state: &AppState,
    room_name: &str,
    files: Vec<PendingFile>,
) -> Result<Vec<StoredObject>, AppError> {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut stored: Vec<StoredObject> = Vec::with_capacity(files.len());

    for (index, file) in files.into_iter().enumerate() {
        let key = object_key(room_name, file.filename.as_deref(), millis, index);
        match state.store.put(&key, file.data, &file.content_type).await {
            Ok(object) => stored.push(object),
            Err(e) => {
                discard(state, &stored).await;
                return Err(e.into());
            }
        }
    }

    Ok(stored)
}

async fn register_files(
    state: &AppState,
    room_name: &str,
    stored: &[StoredObject],
    user: Option<&str>,
) -> Result<(Room, u64), AppError> {
    let room = RoomRepository::new(state.db_pool.clone())
        .get_or_create(room_name)
        .await?;
    let count = ImageRepository::new(state.db_pool.clone())
        .register(room.id, stored, user)
        .await?;
    Ok((room, count))
}

/// Best-effort removal of objects no image row will point at
async fn discard(state: &AppState, stored: &[StoredObject]) {
    for object in stored {
        if let Err(e) = state.store.delete(&object.key).await {
            tracing::warn!("Orphaned object {} left in storage: {}", object.key, e);
        }
    }
}
