//! HTTP request handlers.

pub mod comments;
pub mod common;
pub mod dashboard;
pub mod health;
pub mod likes;
pub mod subscriptions;
pub mod tweets;
pub mod videos;

pub use comments::*;
pub use common::*;
pub use dashboard::*;
pub use health::*;
pub use likes::*;
pub use subscriptions::*;
pub use tweets::*;
pub use videos::*;
