//! Metadata store abstraction and implementations for vidhub.
//!
//! This crate provides the persisted data model:
//! - Users and channels
//! - Videos, with paginated search
//! - Comments and likes
//! - Channel subscriptions
//! - Tweets
//! - Channel dashboard aggregates

pub mod error;
pub mod models;
pub mod postgres;
pub mod repos;
mod sql;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use postgres::PostgresStore;
pub use store::{MetadataStore, SqliteStore};

use std::sync::Arc;
use vidhub_core::config::MetadataConfig;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    config.validate().map_err(MetadataError::Config)?;

    match config {
        MetadataConfig::Sqlite {
            path,
            query_timeout_secs,
        } => {
            let store = SqliteStore::new(path, *query_timeout_secs).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
        MetadataConfig::Postgres(pg) => {
            let store = PostgresStore::connect(pg).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
