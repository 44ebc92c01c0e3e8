//! Throwaway metadata stores for tests.

use sqlx::{Pool, Postgres as SqlxPostgres, Sqlite};
use std::future::Future;
use std::sync::Arc;
use tempfile::TempDir;
use testcontainers::{ContainerAsync, ImageExt, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use vidhub_core::config::PostgresConfig;
use vidhub_metadata::{MetadataError, MetadataResult, MetadataStore, PostgresStore, SqliteStore};

/// Marks errors raised while starting the container, as opposed to schema or
/// connection failures.
pub const POSTGRES_CONTAINER_START_ERR_PREFIX: &str = "postgres-container-start:";

/// SQLite store in a temp dir that is removed on drop.
#[allow(dead_code)]
pub struct TestMetadata {
    sqlite: Arc<SqliteStore>,
    _dir: TempDir,
}

#[allow(dead_code)]
impl TestMetadata {
    pub async fn new() -> MetadataResult<Self> {
        let dir = tempfile::tempdir()?;
        let sqlite = SqliteStore::new(dir.path().join("test.db"), None).await?;
        Ok(Self {
            sqlite: Arc::new(sqlite),
            _dir: dir,
        })
    }

    pub fn store(&self) -> Arc<dyn MetadataStore> {
        self.sqlite.clone()
    }

    /// Pool for raw SQL against the schema.
    pub fn pool(&self) -> &Pool<Sqlite> {
        self.sqlite.pool()
    }
}

/// PostgreSQL store in a disposable container.
#[allow(dead_code)]
pub struct PostgresTestMetadata {
    postgres: Arc<PostgresStore>,
    _container: ContainerAsync<Postgres>,
}

#[allow(dead_code)]
impl PostgresTestMetadata {
    pub async fn new() -> MetadataResult<Self> {
        let container = Postgres::default()
            .with_tag("15-alpine")
            .start()
            .await
            .map_err(|e| {
                MetadataError::Internal(format!("{POSTGRES_CONTAINER_START_ERR_PREFIX} {e}"))
            })?;
        let host = container
            .get_host()
            .await
            .map_err(|e| MetadataError::Internal(e.to_string()))?;
        let port = container
            .get_host_port_ipv4(5432)
            .await
            .map_err(|e| MetadataError::Internal(e.to_string()))?;

        // testcontainers-modules defaults to postgres/postgres.
        let config = PostgresConfig {
            max_connections: 5,
            statement_timeout_ms: None,
            ..PostgresConfig::from_url(format!(
                "postgres://postgres:postgres@{host}:{port}/postgres"
            ))
        };
        let postgres = PostgresStore::connect(&config).await?;

        Ok(Self {
            postgres: Arc::new(postgres),
            _container: container,
        })
    }

    pub fn store(&self) -> Arc<dyn MetadataStore> {
        self.postgres.clone()
    }

    pub fn pool(&self) -> &Pool<SqlxPostgres> {
        self.postgres.pool()
    }
}

/// Start a PostgreSQL store, or `None` when `SKIP_POSTGRES_TESTS` is set or
/// Docker is unavailable. Any other setup failure panics.
#[allow(dead_code)]
pub async fn postgres_or_skip() -> Option<PostgresTestMetadata> {
    if std::env::var("SKIP_POSTGRES_TESTS").is_ok() {
        return None;
    }
    match PostgresTestMetadata::new().await {
        Ok(metadata) => Some(metadata),
        Err(err) => {
            let msg = err.to_string();
            if msg.contains(POSTGRES_CONTAINER_START_ERR_PREFIX) {
                eprintln!("Skipping PostgreSQL test (Docker unavailable): {msg}");
                None
            } else {
                panic!("PostgreSQL test setup failed: {msg}");
            }
        }
    }
}

/// Run `test_fn` against SQLite, then against PostgreSQL when available.
#[allow(dead_code)]
pub async fn run_metadata_test_both<F, Fut>(test_fn: F)
where
    F: Fn(Arc<dyn MetadataStore>) -> Fut,
    Fut: Future<Output = ()>,
{
    let sqlite = TestMetadata::new()
        .await
        .expect("Failed to create SQLite test metadata");
    test_fn(sqlite.store()).await;

    if let Some(postgres) = postgres_or_skip().await {
        test_fn(postgres.store()).await;
    }
}
