//! Shared test harness: a file-backed SQLite pool in a tempdir, the local
//! blob backend, and one instance of each service wired the way `main` wires
//! them.

use bucketd::models::user::User;
use bucketd::services::{BucketRegistry, Credentials, FileService, QuotaLedger};
use bucketd::storage::LocalBlobStore;
use bucketd::validation::UploadLimits;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestEnv {
    pub db: Arc<SqlitePool>,
    pub files: FileService,
    pub buckets: BucketRegistry,
    pub credentials: Credentials,
    pub ledger: QuotaLedger,
    pub blob_dir: std::path::PathBuf,
    // Holds the database file and blob directory for the test's lifetime.
    _dir: TempDir,
}

const MIGRATION_SQL: &str = include_str!("../../migrations/0001_init.sql");

pub async fn setup() -> TestEnv {
    let dir = tempfile::tempdir().expect("create tempdir");
    let db_path = dir.path().join("meta.db");

    let opts = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let db = Arc::new(
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("connect sqlite"),
    );

    for stmt in MIGRATION_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(stmt).execute(&*db).await.expect("migrate");
    }

    let blob_dir = dir.path().join("blobs");
    let blob = Arc::new(LocalBlobStore::new(&blob_dir));
    let ledger = QuotaLedger::new(db.clone());
    let limits = UploadLimits {
        max_file_size: 10 * 1024 * 1024,
        allowed_extensions: vec!["txt".into(), "pdf".into(), "png".into()],
    };

    TestEnv {
        files: FileService::new(db.clone(), blob, ledger.clone(), limits),
        buckets: BucketRegistry::new(db.clone()),
        credentials: Credentials::new(db.clone()),
        ledger,
        blob_dir,
        db,
        _dir: dir,
    }
}

pub async fn signup(env: &TestEnv, email: &str) -> User {
    env.credentials
        .signup(email, "opaque-hash", "Test User")
        .await
        .expect("signup")
}

/// A payload of `size` bytes with deterministic content.
pub fn payload(size: usize) -> bytes::Bytes {
    bytes::Bytes::from(vec![0x5a; size])
}
