use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::env;

/// Which blob backend variant to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Store payloads beneath a local directory.
    Local,
    /// Store payloads in a remote HTTP blob service.
    Remote,
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub backend: BackendKind,
    pub storage_dir: String,
    pub remote_base_url: Option<String>,
    pub remote_token: Option<String>,
    pub max_file_size: i64,
    pub allowed_extensions: Vec<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-tenant bucketed file storage API")]
pub struct Args {
    /// Host to bind to (overrides BUCKETD_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BUCKETD_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides BUCKETD_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Blob backend to use (overrides BUCKETD_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<BackendKind>,

    /// Directory for the local backend (overrides BUCKETD_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Base URL of the remote blob service (overrides BUCKETD_BLOB_URL)
    #[arg(long)]
    pub remote_base_url: Option<String>,

    /// Bearer token for the remote blob service (overrides BUCKETD_BLOB_TOKEN)
    #[arg(long)]
    pub remote_token: Option<String>,

    /// Maximum accepted file size in bytes (overrides BUCKETD_MAX_FILE_SIZE)
    #[arg(long)]
    pub max_file_size: Option<i64>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

const DEFAULT_MAX_FILE_SIZE: i64 = 100 * 1024 * 1024;

const DEFAULT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "xlsx", "csv", "jpg", "jpeg", "png", "gif", "mp4", "avi",
];

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("BUCKETD_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("BUCKETD_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing BUCKETD_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading BUCKETD_PORT"),
        };
        let env_db = env::var("BUCKETD_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/meta/bucketd.db".into());
        let env_backend = match env::var("BUCKETD_BACKEND") {
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "local" => BackendKind::Local,
                "remote" => BackendKind::Remote,
                other => anyhow::bail!("unknown BUCKETD_BACKEND value `{}`", other),
            },
            Err(_) => BackendKind::Local,
        };
        let env_storage = env::var("BUCKETD_STORAGE_DIR").unwrap_or_else(|_| "./data/blobs".into());
        let env_blob_url = env::var("BUCKETD_BLOB_URL").ok();
        let env_blob_token = env::var("BUCKETD_BLOB_TOKEN").ok();
        let env_max_size = match env::var("BUCKETD_MAX_FILE_SIZE") {
            Ok(value) => value
                .parse::<i64>()
                .with_context(|| format!("parsing BUCKETD_MAX_FILE_SIZE value `{}`", value))?,
            Err(_) => DEFAULT_MAX_FILE_SIZE,
        };
        let allowed_extensions = match env::var("BUCKETD_ALLOWED_EXTENSIONS") {
            Ok(value) => value
                .split(',')
                .map(|ext| ext.trim().to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            Err(_) => DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            backend: args.backend.unwrap_or(env_backend),
            storage_dir: args.storage_dir.unwrap_or(env_storage),
            remote_base_url: args.remote_base_url.or(env_blob_url),
            remote_token: args.remote_token.or(env_blob_token),
            max_file_size: args.max_file_size.unwrap_or(env_max_size),
            allowed_extensions,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
