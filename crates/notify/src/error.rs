use std::time::Duration;

use crate::delivery::email::EmailError;

/// Error type for a single provider delivery attempt.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The underlying HTTP request failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status code.
    #[error("Provider returned HTTP {0}")]
    HttpStatus(u16),

    /// The provider accepted the request but refused the message.
    #[error("Provider rejected the message: {0}")]
    Rejected(String),

    /// SMTP delivery failed.
    #[error(transparent)]
    Email(#[from] EmailError),

    /// The attempt did not finish within the dispatcher's timeout.
    #[error("Provider timed out after {0:?}")]
    Timeout(Duration),

    /// The provider panicked while sending.
    #[error("Provider panicked during send")]
    Panicked,
}
