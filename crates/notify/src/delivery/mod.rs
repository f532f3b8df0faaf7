//! Concrete notification providers.
//!
//! Each provider implements [`NotificationProvider`](crate::NotificationProvider)
//! and performs exactly one outbound request per `send`. Ordering,
//! fallback and timeouts are the dispatcher's job.

pub mod email;
pub mod push;
pub mod sms;
