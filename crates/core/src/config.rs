//! Configuration types shared across crates.
//!
//! Every section deserializes from an empty table, so a config file only needs
//! the values that differ from the defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP listener and API behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, `host:port`.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Largest page size a list endpoint will return. Larger `limit` values
    /// are clamped to this.
    #[serde(default = "default_max_page_limit")]
    pub max_page_limit: u64,
    /// Reject comment and video mutations that do not identify an acting user.
    /// Tweets always require one.
    #[serde(default)]
    pub require_owner_identity: bool,
    /// Serve Prometheus metrics on `/metrics`. Restrict access to the scraper
    /// at the network level.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_page_limit() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_page_limit: default_max_page_limit(),
            require_owner_identity: false,
            metrics_enabled: true,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_page_limit == 0 || self.max_page_limit > crate::MAX_PAGE_LIMIT {
            return Err(format!(
                "server.max_page_limit must be between 1 and {}, got {}",
                crate::MAX_PAGE_LIMIT,
                self.max_page_limit
            ));
        }
        Ok(())
    }
}

/// Where media bytes live.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// A directory on the local disk.
    Filesystem { path: PathBuf },
    /// An S3-compatible bucket.
    S3(S3Config),
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/media"),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Filesystem { path } if path.as_os_str().is_empty() => {
                Err("storage.path cannot be empty".to_string())
            }
            Self::Filesystem { .. } => Ok(()),
            Self::S3(s3) => s3.validate(),
        }
    }
}

/// S3 bucket settings. Without explicit keys the ambient AWS credential
/// chain (environment, profile, instance role) is used.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    /// Custom endpoint for MinIO and similar services. A bare `host:port`
    /// is treated as plain http.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Key prefix inside the bucket.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Prefer `VIDHUB_STORAGE__ACCESS_KEY_ID` over the config file.
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Path-style addressing (`endpoint/bucket/key`), needed by MinIO.
    #[serde(default)]
    pub force_path_style: bool,
}

impl S3Config {
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("storage.bucket cannot be empty".to_string());
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(
                "storage.access_key_id and storage.secret_access_key must be set together"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// TLS negotiation for PostgreSQL connections.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PgSslMode {
    Disable,
    #[default]
    Prefer,
    Require,
}

/// Where relational records live.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// Single-file SQLite database, for development and small deployments.
    Sqlite {
        path: PathBuf,
        /// Slow-query threshold. SQLite cannot cancel statements, so this is
        /// only reported at startup.
        #[serde(default)]
        query_timeout_secs: Option<u64>,
    },
    Postgres(PostgresConfig),
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/metadata.db"),
            query_timeout_secs: None,
        }
    }
}

impl MetadataConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Sqlite { .. } => Ok(()),
            Self::Postgres(pg) => pg.validate(),
        }
    }
}

/// PostgreSQL connection. Either `url`, or `host` plus `database` with the
/// optional credential fields; `url` wins when both are given.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostgresConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    /// Prefer `VIDHUB_METADATA__PASSWORD` over the config file.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub ssl_mode: Option<PgSslMode>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Server-side `statement_timeout`; `None` leaves the server default.
    #[serde(default = "default_statement_timeout_ms")]
    pub statement_timeout_ms: Option<u64>,
}

fn default_pg_port() -> u16 {
    5432
}

fn default_max_connections() -> u32 {
    10
}

fn default_statement_timeout_ms() -> Option<u64> {
    Some(30_000)
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: default_pg_port(),
            username: None,
            password: None,
            database: None,
            ssl_mode: None,
            max_connections: default_max_connections(),
            statement_timeout_ms: default_statement_timeout_ms(),
        }
    }
}

impl PostgresConfig {
    /// Connect by URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("metadata.max_connections cannot be 0".to_string());
        }
        match (&self.url, &self.host, &self.database) {
            (Some(_), _, _) | (None, Some(_), Some(_)) => Ok(()),
            (None, Some(_), None) => {
                Err("metadata.database is required when metadata.host is set".to_string())
            }
            (None, None, _) => {
                Err("postgres metadata needs either url or host and database".to_string())
            }
        }
    }
}

/// Media hosting configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Base URL under which stored media is publicly served. Secure
    /// locations are formed as `{public_base_url}/{key}`.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// Allow a plain http base URL (development only).
    #[serde(default)]
    pub allow_insecure_urls: bool,
}

fn default_public_base_url() -> String {
    "https://media.localhost".to_string()
}

fn default_max_upload_bytes() -> u64 {
    512 * 1024 * 1024
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            public_base_url: default_public_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
            allow_insecure_urls: false,
        }
    }
}

impl MediaConfig {
    pub fn validate(&self) -> Result<(), String> {
        let base = self.public_base_url.trim();
        if base.is_empty() {
            return Err("media.public_base_url cannot be empty".to_string());
        }
        if !base.starts_with("https://")
            && !(self.allow_insecure_urls && base.starts_with("http://"))
        {
            return Err(format!(
                "media.public_base_url must use https (got {base}); \
                 set media.allow_insecure_urls for local development"
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err("media.max_upload_bytes cannot be 0".to_string());
        }
        Ok(())
    }
}

/// A user account created at startup if missing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
}

/// Startup seeding configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Users to create if they do not already exist (matched by username).
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl BootstrapConfig {
    pub fn validate(&self) -> Result<(), String> {
        for user in &self.users {
            if user.username.trim().is_empty() {
                return Err("bootstrap.users entries require a username".to_string());
            }
            if !user.email.contains('@') {
                return Err(format!(
                    "bootstrap user {} has an invalid email: {}",
                    user.username, user.email
                ));
            }
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    /// Defaults with local filesystem storage and SQLite metadata. Tests
    /// override the paths.
    pub fn for_testing() -> Self {
        Self::default()
    }

    /// Validate every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.storage.validate()?;
        self.metadata.validate()?;
        self.media.validate()?;
        self.bootstrap.validate()
    }
}
