//! Row models and insert DTOs.

pub mod monitoring;
pub mod user;
