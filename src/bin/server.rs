//! Server Binary - HTTP API over the configured storage backend
//!
//! It wires up:
//! - Object store (local filesystem or S3)
//! - SQLite metadata store
//! - ffmpeg/ffprobe media tool
//! - Axum router

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use videoverse::adapters::ffmpeg::FfmpegTool;
use videoverse::adapters::local::{FsAdapter, UrlSigner};
use videoverse::adapters::sqlite::SqliteVideoRepository;
use videoverse::config::{Config, StorageBackend};
use videoverse::http::{router, AppState};
use videoverse::ports::StoragePort;
use videoverse::{MediaLimits, VideoService};

const DATABASE_MAX_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // 1. Adapters
    let (storage, local_media): (Arc<dyn StoragePort>, Option<FsAdapter>) = match &config.storage {
        StorageBackend::Local {
            dir,
            public_base_url,
            signing_secret,
        } => {
            let fs = FsAdapter::new(dir.clone(), UrlSigner::new(signing_secret.clone(), public_base_url.clone()))
                .await
                .context("Failed to prepare local storage")?;
            tracing::info!(dir = %dir.display(), "Using local storage");
            (Arc::new(fs.clone()), Some(fs))
        }
        StorageBackend::S3 {
            bucket,
            region,
            endpoint,
        } => (s3_storage(bucket, region, endpoint.clone())?, None),
    };

    let repository = SqliteVideoRepository::connect(&config.database_url, DATABASE_MAX_CONNECTIONS)
        .await
        .context("Failed to open the metadata store")?;
    let media = FfmpegTool::new(config.ffmpeg_path.clone(), config.ffprobe_path.clone());

    // 2. Application Service
    let service = VideoService::new(
        storage,
        Arc::new(repository),
        Arc::new(media),
        MediaLimits {
            max_file_size_mb: config.max_file_size,
            min_duration: config.min_duration,
            max_duration: config.max_duration,
        },
        config.scratch_dir.clone(),
    );

    if config.api_tokens.is_empty() {
        tracing::warn!("API_TOKENS is empty, the video API is unauthenticated");
    }

    // 3. HTTP Layer
    let app = router(AppState {
        service,
        local_media,
        api_tokens: Arc::new(config.api_tokens.clone()),
        expose_errors: !config.environment.is_production(),
    });

    // 4. Start Server
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr()))?;
    tracing::info!(addr = %config.bind_addr(), environment = ?config.environment, "Listening");
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}

#[cfg(feature = "s3")]
fn s3_storage(bucket: &str, region: &str, endpoint: Option<String>) -> anyhow::Result<Arc<dyn StoragePort>> {
    let s3 = videoverse::adapters::s3::S3Adapter::new(bucket.to_string(), region.to_string(), endpoint)
        .context("Failed to configure S3 storage")?;
    tracing::info!(bucket, region, "Using S3 storage");
    Ok(Arc::new(s3))
}

#[cfg(not(feature = "s3"))]
fn s3_storage(_bucket: &str, _region: &str, _endpoint: Option<String>) -> anyhow::Result<Arc<dyn StoragePort>> {
    anyhow::bail!("STORAGE_BACKEND=s3 requires building with the `s3` feature")
}
