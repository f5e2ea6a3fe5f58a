//! Configuration loaded from the environment (and `.env`, when present).

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} has an unsupported value {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Prod
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StorageBackend {
    /// Files under a directory, served through signed `/media` URLs
    Local {
        dir: PathBuf,
        public_base_url: String,
        signing_secret: String,
    },
    /// S3-compatible bucket with native presigned URLs
    S3 {
        bucket: String,
        region: String,
        endpoint: Option<String>,
    },
}

#[derive(Clone, Debug)]
pub struct Config {
    /// HTTP server bind address
    pub host: String,
    /// HTTP server port
    pub port: u16,
    pub environment: Environment,
    /// sqlx connection URL of the metadata store
    pub database_url: String,
    /// Megabytes
    pub max_file_size: f64,
    /// Seconds, inclusive
    pub min_duration: f64,
    /// Seconds, inclusive
    pub max_duration: f64,
    /// Root under which request workspaces are created
    pub scratch_dir: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub storage: StorageBackend,
    /// Accepted bearer tokens; empty disables authentication
    pub api_tokens: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let environment = match var("ENVIRONMENT", "dev").to_lowercase().as_str() {
            "dev" | "development" => Environment::Dev,
            "prod" | "production" => Environment::Prod,
            "test" => Environment::Test,
            other => {
                return Err(ConfigError::InvalidValue {
                    name: "ENVIRONMENT",
                    value: other.to_string(),
                })
            }
        };

        let storage = match var("STORAGE_BACKEND", "local").to_lowercase().as_str() {
            "local" => StorageBackend::Local {
                dir: PathBuf::from(var("STORAGE_DIR", "./storage")),
                public_base_url: var("PUBLIC_BASE_URL", "http://localhost:8000"),
                signing_secret: lookup("SIGNING_SECRET")
                    .filter(|secret| !secret.is_empty())
                    .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string()),
            },
            "s3" => StorageBackend::S3 {
                bucket: lookup("S3_BUCKET")
                    .filter(|bucket| !bucket.is_empty())
                    .ok_or(ConfigError::Missing("S3_BUCKET"))?,
                region: var("S3_REGION", "us-east-1"),
                endpoint: lookup("S3_ENDPOINT").filter(|endpoint| !endpoint.is_empty()),
            },
            other => {
                return Err(ConfigError::InvalidValue {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let api_tokens = var("API_TOKENS", "")
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse(&lookup, "PORT", 8000)?,
            environment,
            database_url: var("DATABASE_URL", "sqlite://videoverse.db?mode=rwc"),
            max_file_size: parse(&lookup, "MAX_FILE_SIZE", 25.0)?,
            min_duration: parse(&lookup, "MIN_DURATION", 5.0)?,
            max_duration: parse(&lookup, "MAX_DURATION", 300.0)?,
            scratch_dir: lookup("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            ffmpeg_path: PathBuf::from(var("FFMPEG_PATH", "ffmpeg")),
            ffprobe_path: PathBuf::from(var("FFPROBE_PATH", "ffprobe")),
            storage,
            api_tokens,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
    }
}
