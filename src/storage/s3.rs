//! S3-compatible backend (AWS S3, MinIO, R2, ...).

use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region, SharedCredentialsProvider},
    primitives::ByteStream,
    types::ObjectCannedAcl,
    Client,
};
use tracing::info;

use super::{public_url, ObjectStore, StorageError, StoredObject};
use crate::config::Config;

#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
    public_base_url: Option<String>,
    public_read: bool,
}

impl S3Store {
    /// Build a client from configuration.
    ///
    /// Static credentials are used when both keys are configured. A custom
    /// endpoint switches to path-style addressing.
    pub fn new(config: &Config) -> Result<Self, StorageError> {
        if config.bucket_name.is_empty() {
            return Err(StorageError::Config("bucket name is empty".to_string()));
        }

        let mut builder = aws_sdk_s3::Config::builder()
            .region(Region::new(config.aws_region.clone()));

        if let (Some(access_key), Some(secret_key)) =
            (&config.aws_access_key_id, &config.aws_secret_access_key)
        {
            let credentials = Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "environment",
            );
            builder = builder.credentials_provider(SharedCredentialsProvider::new(credentials));
        }

        if let Some(endpoint) = &config.s3_endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let client = Client::from_conf(builder.build());

        info!(
            bucket = %config.bucket_name,
            endpoint = ?config.s3_endpoint,
            public_read = config.s3_public_read,
            "S3 client initialized"
        );

        Ok(Self {
            client,
            bucket: config.bucket_name.clone(),
            public_base_url: config.public_base_url.clone(),
            public_read: config.s3_public_read,
        })
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .set_acl(self.public_read.then_some(ObjectCannedAcl::PublicRead))
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(key, size, "Stored object");

        Ok(StoredObject {
            key: key.to_string(),
            location: public_url(self.public_base_url.as_deref(), &self.bucket, key),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Delete {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
