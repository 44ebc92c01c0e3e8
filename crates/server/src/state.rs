//! Application state shared across handlers.

use crate::handlers::common::OwnerPolicy;
use std::sync::Arc;
use vidhub_core::config::AppConfig;
use vidhub_metadata::MetadataStore;
use vidhub_storage::{MediaLibrary, ObjectStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Media host for uploaded videos and thumbnails.
    pub media: MediaLibrary,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn ObjectStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        if config.media.allow_insecure_urls {
            tracing::warn!(
                public_base_url = %config.media.public_base_url,
                "Insecure media URLs allowed; do not use in production"
            );
        }
        let media = MediaLibrary::new(storage, &config.media);

        Self {
            config: Arc::new(config),
            metadata,
            media,
        }
    }

    /// Largest page size a list endpoint returns.
    pub fn max_page_limit(&self) -> u64 {
        self.config.server.max_page_limit
    }

    /// Ownership policy for comment and video mutations.
    pub fn owner_policy(&self) -> OwnerPolicy {
        if self.config.server.require_owner_identity {
            OwnerPolicy::Required
        } else {
            OwnerPolicy::WhenIdentified
        }
    }
}
