//! Object storage for uploaded images.
//!
//! Handlers only see the `ObjectStore` trait; production wires in `S3Store`.

pub mod s3;
#[cfg(test)]
pub mod memory;

pub use s3::S3Store;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    /// Object key inside the bucket
    pub key: String,
    /// Public URL of the object
    pub location: String,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to upload {key}: {reason}")]
    Upload { key: String, reason: String },

    #[error("Failed to delete {key}: {reason}")]
    Delete { key: String, reason: String },

    #[error("Storage configuration error: {0}")]
    Config(String),
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key` and return its public location.
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Build the object key for the `index`-th file of an upload:
/// `{room}/{millis}_{index}_{filename}`.
///
/// The index keeps same-named files of one request apart. Path separators in
/// the client-supplied filename are replaced so the key always stays one
/// level below the room prefix.
pub fn object_key(room: &str, filename: Option<&str>, millis: i64, index: usize) -> String {
    let filename = match filename.map(str::trim) {
        Some(name) if !name.is_empty() => name.replace(['/', '\\'], "_"),
        _ => "upload".to_string(),
    };
    format!("{}/{}_{}_{}", room, millis, index, filename)
}

/// Public URL for `key`, either under a configured base or the bucket's
/// virtual-hosted S3 address.
pub fn public_url(base: Option<&str>, bucket: &str, key: &str) -> String {
    match base {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
        None => format!("https://{}.s3.amazonaws.com/{}", bucket, key),
    }
}
