//! HTTP handler functions, grouped by feature.

pub mod dashboard;
pub mod history;
pub mod messages;
pub mod monitor;
