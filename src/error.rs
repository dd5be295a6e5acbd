use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::image::RegisterError;
use crate::storage::StorageError;

/// Errors returned by the HTTP handlers.
///
/// Every variant renders as `{ "success": false, "message": ... }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Room ID is required.")]
    MissingRoomId,

    #[error("No images provided.")]
    NoFiles,

    #[error("File too large (max: {max_size} bytes).")]
    TooLarge { max_size: usize },

    #[error("Invalid upload: {0}")]
    Multipart(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("No images found for this room.")]
    NotFound,

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Storage error")]
    Storage(#[from] StorageError),
}

impl From<RegisterError> for AppError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::NoFiles => Self::NoFiles,
            RegisterError::Database(e) => Self::Database(e),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingRoomId | Self::NoFiles | Self::Multipart(_) | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            Self::Database(e) => tracing::error!("Database error: {}", e),
            Self::Storage(e) => tracing::error!("{}", e),
            _ => tracing::debug!("Request rejected: {}", self),
        }

        let body = Json(json!({
            "success": false,
            "message": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}
