mod config;
mod db;
mod error;
mod handlers;
mod models;
mod storage;

use anyhow::{Context, Result};
use config::Config;
use sqlx::SqlitePool;
use std::sync::Arc;
use storage::{ObjectStore, S3Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub struct AppState {
    pub db_pool: SqlitePool,
    pub store: Arc<dyn ObjectStore>,
    pub max_upload_bytes: usize,
    pub max_request_bytes: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gallery=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    // Set up database
    tracing::info!("Connecting to database: {}", config.database_url);
    let db_pool = db::create_pool(&config.database_url).await
        .context("Failed to create database pool")?;

    tracing::info!("Running database migrations");
    db::run_migrations(&db_pool).await
        .context("Failed to run migrations")?;

    let store = S3Store::new(&config)
        .context("Failed to create S3 client")?;

    let state = Arc::new(AppState {
        db_pool,
        store: Arc::new(store),
        max_upload_bytes: config.max_upload_bytes,
        max_request_bytes: config.max_request_bytes,
    });

    let app = handlers::router(state);

    let addr = config.bind_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
