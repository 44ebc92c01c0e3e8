//! Core domain types and shared logic for the vidhub video platform.
//!
//! This crate defines the pieces shared by the store, storage and server crates:
//! - Configuration types
//! - Record identifiers and their validation
//! - Pagination and sort specifications for list endpoints
//! - Like targets and toggle outcomes
//! - Duration probing for uploaded video containers

pub mod config;
pub mod error;
pub mod id;
pub mod mp4;
pub mod pagination;
pub mod sort;
pub mod target;

pub use error::{Error, Result};
pub use id::{EntityKind, parse_id};
pub use pagination::{PageInfo, PageRequest};
pub use sort::{SortDirection, SortField, VideoSort};
pub use target::{LikeTarget, ToggleOutcome};

/// Default page number for list endpoints.
pub const DEFAULT_PAGE: u64 = 1;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;

/// Hard ceiling on the configurable page size.
pub const MAX_PAGE_LIMIT: u64 = 1000;
