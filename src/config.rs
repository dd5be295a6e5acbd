use anyhow::{Context, Result};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;
const DEFAULT_MAX_REQUEST_BYTES: usize = 100 * 1024 * 1024;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub bucket_name: String,
    pub aws_region: String,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    /// Custom S3-compatible endpoint (MinIO, R2, ...)
    pub s3_endpoint: Option<String>,
    /// Base URL for public object links, instead of the bucket's S3 host
    pub public_base_url: Option<String>,
    pub s3_public_read: bool,
    /// Per-file limit
    pub max_upload_bytes: usize,
    /// Whole request body limit
    pub max_request_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = optional("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("Invalid PORT")?;

        let s3_public_read = optional("S3_PUBLIC_READ")
            .unwrap_or_else(|| "true".to_string())
            .parse::<bool>()
            .context("Invalid S3_PUBLIC_READ")?;

        let max_upload_bytes = match optional("MAX_UPLOAD_BYTES") {
            Some(v) => v.parse::<usize>().context("Invalid MAX_UPLOAD_BYTES")?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let max_request_bytes = match optional("MAX_REQUEST_BYTES") {
            Some(v) => v.parse::<usize>().context("Invalid MAX_REQUEST_BYTES")?,
            None => DEFAULT_MAX_REQUEST_BYTES.max(max_upload_bytes),
        };

        Ok(Self {
            database_url: optional("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:gallery.db".to_string()),
            host: optional("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            bucket_name: optional("BUCKET_NAME").context("BUCKET_NAME must be set")?,
            aws_region: optional("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            aws_access_key_id: optional("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: optional("AWS_SECRET_ACCESS_KEY"),
            s3_endpoint: optional("S3_ENDPOINT"),
            public_base_url: optional("PUBLIC_BASE_URL"),
            s3_public_read,
            max_upload_bytes,
            max_request_bytes,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BUCKET_NAME", "photos")]).unwrap();
        assert_eq!(config.database_url, "sqlite:gallery.db");
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.aws_region, "us-east-1");
        assert!(config.s3_public_read);
        assert_eq!(config.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.max_request_bytes, 100 * 1024 * 1024);
        assert!(config.aws_access_key_id.is_none());
        assert!(config.s3_endpoint.is_none());
    }

    #[test]
    fn test_bucket_required() {
        assert!(load(&[]).is_err());
        assert!(load(&[("BUCKET_NAME", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("BUCKET_NAME", "photos"),
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("S3_PUBLIC_READ", "false"),
            ("MAX_UPLOAD_BYTES", "1024"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.s3_endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(!config.s3_public_read);
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_port() {
        assert!(load(&[("BUCKET_NAME", "photos"), ("PORT", "http")]).is_err());
    }
}
