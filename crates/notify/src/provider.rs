//! The provider seam and the per-attempt bookkeeping types.

use async_trait::async_trait;
use hostwatch_core::alert::{join_messages, AlertDescriptor};
use serde::Serialize;

use crate::error::ProviderError;

/// Subject line used for alert emails.
pub const ALERT_SUBJECT: &str = "Server Alert Notification";

/// Subject line used for status reports and free-form messages.
pub const STATUS_SUBJECT: &str = "Server Status";

/// Delivery channel a provider belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Push,
    Sms,
    Email,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Push => "push",
            Channel::Sms => "sms",
            Channel::Email => "email",
        }
    }
}

/// The rendered notification handed to every provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    /// Combine all alerts into one greeting-prefixed message.
    pub fn for_alerts(display_name: &str, alerts: &[AlertDescriptor]) -> Self {
        Self {
            subject: ALERT_SUBJECT.to_string(),
            body: format!("Hi {display_name}, ALERT: {}", join_messages(alerts)),
        }
    }

    /// An operator-raised alert with free-form text.
    pub fn manual(display_name: &str, text: &str) -> Self {
        Self {
            subject: ALERT_SUBJECT.to_string(),
            body: format!("Hi {display_name}, ALERT: {}", text.trim()),
        }
    }

    /// A plain informational message, sent as-is.
    pub fn informational(body: impl Into<String>) -> Self {
        Self {
            subject: STATUS_SUBJECT.to_string(),
            body: body.into(),
        }
    }
}

/// A single notification backend.
///
/// `target` is the channel-specific address: a push token, a phone number
/// in `+<country><number>` form, or an email address.
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Short identifier recorded in attempts, e.g. `"twilio"`.
    fn name(&self) -> &str;

    fn channel(&self) -> Channel;

    async fn send(&self, target: &str, message: &AlertMessage) -> Result<(), ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Sent,
    Failed,
    Skipped,
}

impl AttemptOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptOutcome::Sent => "sent",
            AttemptOutcome::Failed => "failed",
            AttemptOutcome::Skipped => "skipped",
        }
    }
}

/// What happened when one provider was (or was not) tried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAttempt {
    pub channel: Channel,
    pub provider: String,
    pub outcome: AttemptOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl NotificationAttempt {
    pub fn sent(channel: Channel, provider: &str) -> Self {
        Self {
            channel,
            provider: provider.to_string(),
            outcome: AttemptOutcome::Sent,
            error_detail: None,
        }
    }

    pub fn failed(channel: Channel, provider: &str, error: &ProviderError) -> Self {
        Self {
            channel,
            provider: provider.to_string(),
            outcome: AttemptOutcome::Failed,
            error_detail: Some(error.to_string()),
        }
    }

    pub fn skipped(channel: Channel, provider: &str, reason: &str) -> Self {
        Self {
            channel,
            provider: provider.to_string(),
            outcome: AttemptOutcome::Skipped,
            error_detail: Some(reason.to_string()),
        }
    }

    pub fn is_sent(&self) -> bool {
        self.outcome == AttemptOutcome::Sent
    }
}
