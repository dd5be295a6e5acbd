use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Uploader tag for images every requester may see
pub const ALL_USERS: &str = "all";

#[cfg_attr(not(test), allow(dead_code))]
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Image {
    pub id: i64,
    pub room_id: i64,
    pub image_url: String,
    pub upload_date: String,
    pub user: String,
}

/// One row of a room listing, joined with the room's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RoomImage {
    pub name: String,
    pub image_url: String,
    pub upload_date: String,
    pub user: String,
}

/// Map a missing or blank uploader tag to `"all"`
pub fn normalize_user(user: Option<&str>) -> String {
    match user.map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => ALL_USERS.to_string(),
    }
}

/// Current time as ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T10:11:12.345Z`
pub fn upload_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
