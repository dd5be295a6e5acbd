use crate::models::image::{normalize_user, upload_timestamp};
use crate::models::{RoomImage, ALL_USERS};
use crate::storage::StoredObject;
use sqlx::SqlitePool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("No images provided")]
    NoFiles,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct ImageRepository {
    pool: SqlitePool,
}

impl ImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record one image row per stored file, all tagged with `user`.
    ///
    /// The rows are written in a single transaction: either every file is
    /// registered or none is.
    pub async fn register(
        &self,
        room_id: i64,
        files: &[StoredObject],
        user: Option<&str>,
    ) -> Result<u64, RegisterError> {
        if files.is_empty() {
            return Err(RegisterError::NoFiles);
        }

        let user = normalize_user(user);
        let mut tx = self.pool.begin().await?;

        for file in files {
            sqlx::query(
                "INSERT INTO images (room_id, image_url, upload_date, user)
                 VALUES (?, ?, ?, ?)"
            )
            .bind(room_id)
            .bind(&file.location)
            .bind(upload_timestamp())
            .bind(&user)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!("Registered {} image(s) in room {} for '{}'", files.len(), room_id, user);
        Ok(files.len() as u64)
    }

    /// Images of the named room tagged either with `requester` or with `"all"`.
    ///
    /// The filter always applies, so a requester named `"all"` only sees
    /// images tagged `"all"`.
    pub async fn list_visible(
        &self,
        room_name: &str,
        requester: &str,
    ) -> Result<Vec<RoomImage>, sqlx::Error> {
        sqlx::query_as::<_, RoomImage>(
            "SELECT rooms.name, images.image_url, images.upload_date, images.user
             FROM rooms
             JOIN images ON rooms.id = images.room_id
             WHERE rooms.name = ?
               AND (images.user = ? OR images.user = ?)"
        )
        .bind(room_name)
        .bind(requester)
        .bind(ALL_USERS)
        .fetch_all(&self.pool)
        .await
    }

    #[cfg(test)]
    pub async fn count_in_room(&self, room_id: i64) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM images WHERE room_id = ?")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
