//! Server test utilities.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;
use vidhub_core::config::{AppConfig, MetadataConfig, StorageConfig};
use vidhub_metadata::{MetadataStore, SqliteStore};
use vidhub_server::identity::USER_ID_HEADER;
use vidhub_server::{AppState, create_router};
use vidhub_storage::{FilesystemBackend, ObjectStore};

use super::fixtures::MultipartForm;

/// A router over a temp dir with filesystem storage and SQLite metadata.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub storage_path: PathBuf,
    sqlite: Arc<SqliteStore>,
    _temp_dir: TempDir,
}

/// Status and decoded JSON body of a response. `Value::Null` when empty.
pub type TestResponse = (StatusCode, Value);

#[allow(dead_code)]
impl TestServer {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        Self::build(modifier, |path| async move {
            let storage: Arc<dyn ObjectStore> = Arc::new(
                FilesystemBackend::new(&path)
                    .await
                    .expect("Failed to create storage backend"),
            );
            storage
        })
        .await
    }

    /// Create a test server whose object store is built by `make_storage`
    /// from the storage root.
    pub async fn with_storage<F, Fut>(make_storage: F) -> Self
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: std::future::Future<Output = Arc<dyn ObjectStore>>,
    {
        Self::build(|_| {}, make_storage).await
    }

    async fn build<M, F, Fut>(modifier: M, make_storage: F) -> Self
    where
        M: FnOnce(&mut AppConfig),
        F: FnOnce(PathBuf) -> Fut,
        Fut: std::future::Future<Output = Arc<dyn ObjectStore>>,
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage_path = temp_dir.path().join("storage");
        std::fs::create_dir_all(&storage_path).expect("Failed to create storage directory");
        let storage = make_storage(storage_path.clone()).await;

        let db_path = temp_dir.path().join("metadata.db");
        let sqlite = Arc::new(
            SqliteStore::new(&db_path, None)
                .await
                .expect("Failed to create metadata store"),
        );
        let metadata: Arc<dyn MetadataStore> = sqlite.clone();

        let mut config = AppConfig {
            storage: StorageConfig::Filesystem {
                path: storage_path.clone(),
            },
            metadata: MetadataConfig::Sqlite {
                path: db_path,
                query_timeout_secs: None,
            },
            ..AppConfig::for_testing()
        };
        config.media.public_base_url = "https://media.test".to_string();
        modifier(&mut config);

        let state = AppState::new(config, storage, metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            storage_path,
            sqlite,
            _temp_dir: temp_dir,
        }
    }

    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }

    /// Pool behind the metadata store, for raw SQL such as fault triggers.
    pub fn sqlite_pool(&self) -> &Pool<Sqlite> {
        self.sqlite.pool()
    }

    /// Keys of every stored media object.
    pub fn stored_keys(&self) -> Vec<String> {
        super::storage::stored_keys(&self.storage_path)
    }

    /// Send a request with an optional JSON body and acting-user header.
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
        user: Option<Uuid>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let body = match body {
            Some(v) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    /// Send a multipart form with an optional acting-user header.
    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        form: MultipartForm,
        user: Option<Uuid>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", MultipartForm::content_type());
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        self.send(builder.body(Body::from(form.finish())).unwrap())
            .await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.json("GET", uri, None, None).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
