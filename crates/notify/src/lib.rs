//! Hostwatch notification delivery.
//!
//! This crate provides the building blocks for getting an alert in front of
//! a person:
//!
//! - [`NotificationProvider`]: one delivery backend (push, SMS or email).
//! - [`delivery`]: the concrete FCM, Twilio, Fast2SMS, Textbelt and SMTP
//!   providers.
//! - [`Dispatcher`]: push first, then the ordered SMS chain, with email
//!   running alongside.
//! - [`NotifyConfig`]: environment-driven provider configuration.

pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod error;
pub mod provider;

pub use config::NotifyConfig;
pub use delivery::email::{EmailConfig, SmtpEmailProvider};
pub use dispatcher::{DeliveryOutcome, Dispatcher, ProviderSummary};
pub use error::ProviderError;
pub use provider::{AlertMessage, AttemptOutcome, Channel, NotificationAttempt, NotificationProvider};
