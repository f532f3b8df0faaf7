//! Hostwatch domain types and pure alerting logic.
//!
//! Nothing in this crate touches the network or the database. The snapshot,
//! threshold and alert types defined here flow through the notification and
//! pipeline crates unchanged.

pub mod alert;
pub mod error;
pub mod log_type;
pub mod metrics;
pub mod notification;
pub mod recipient;
pub mod thresholds;
pub mod types;
