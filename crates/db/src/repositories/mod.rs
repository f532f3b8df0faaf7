//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod alert_repo;
pub mod log_repo;
pub mod metrics_sample_repo;
pub mod notification_repo;
pub mod user_repo;

pub use alert_repo::AlertRepo;
pub use log_repo::LogRepo;
pub use metrics_sample_repo::MetricsSampleRepo;
pub use notification_repo::NotificationRepo;
pub use user_repo::UserRepo;
