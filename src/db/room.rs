use crate::models::Room;
use sqlx::SqlitePool;

pub struct RoomRepository {
    pool: SqlitePool,
}

impl RoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Room>, sqlx::Error> {
        sqlx::query_as::<_, Room>("SELECT id, name FROM rooms WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find the room with this name, creating it on first use.
    ///
    /// Runs as a single upsert against the unique `name` column, so concurrent
    /// callers for the same new name all get the same row.
    pub async fn get_or_create(&self, name: &str) -> Result<Room, sqlx::Error> {
        sqlx::query_as::<_, Room>(
            "INSERT INTO rooms (name) VALUES (?)
             ON CONFLICT(name) DO UPDATE SET name = excluded.name
             RETURNING id, name"
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    #[cfg(test)]
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
