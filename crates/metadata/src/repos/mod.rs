//! Repository traits for metadata operations.

pub mod comments;
pub mod dashboard;
pub mod likes;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;

pub use comments::CommentRepo;
pub use dashboard::DashboardRepo;
pub use likes::LikeRepo;
pub use subscriptions::SubscriptionRepo;
pub use tweets::TweetRepo;
pub use users::UserRepo;
pub use videos::VideoRepo;
