//! SMS gateways, tried in order by the dispatcher.
//!
//! - [`TwilioSms`]: provider A, REST API with basic auth.
//! - [`Fast2Sms`]: provider B, bulk JSON API keyed by an API token.
//! - [`TextbeltSms`]: provider C, always available through the free key.

use async_trait::async_trait;
use hostwatch_core::recipient::mask_address;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::provider::{AlertMessage, Channel, NotificationProvider};

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";
const FAST2SMS_ENDPOINT: &str = "https://www.fast2sms.com/dev/bulkV2";
const TEXTBELT_ENDPOINT: &str = "https://textbelt.com/text";

/// Free-tier Textbelt key (one message per day per IP).
pub const TEXTBELT_FREE_KEY: &str = "textbelt";

// ---------------------------------------------------------------------------
// Twilio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl TwilioConfig {
    /// Returns `None` unless `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN` and
    /// `TWILIO_PHONE_NUMBER` are all set.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").ok()?,
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").ok()?,
            from_number: std::env::var("TWILIO_PHONE_NUMBER").ok()?,
        })
    }
}

pub struct TwilioSms {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioSms {
    pub fn new(client: reqwest::Client, config: TwilioConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl NotificationProvider for TwilioSms {
    fn name(&self) -> &str {
        "twilio"
    }

    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn send(&self, target: &str, message: &AlertMessage) -> Result<(), ProviderError> {
        let url = format!(
            "{TWILIO_API_BASE}/Accounts/{}/Messages.json",
            self.config.account_sid
        );
        let form = [
            ("To", target),
            ("From", self.config.from_number.as_str()),
            ("Body", message.body.as_str()),
        ];

        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(to = %mask_address(target), "Alert SMS sent via Twilio");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fast2SMS
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct Fast2SmsResponse {
    #[serde(rename = "return")]
    ok: bool,
    #[serde(default)]
    message: serde_json::Value,
}

pub struct Fast2Sms {
    client: reqwest::Client,
    api_key: String,
    /// Country code digits without the `+`, e.g. `"91"`.
    country_digits: String,
}

impl Fast2Sms {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, country_code: &str) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            country_digits: country_code.trim_start_matches('+').to_string(),
        }
    }
}

/// Fast2SMS wants bare digits that always carry the country code.
fn fast2sms_number(target: &str, country_digits: &str) -> String {
    let digits = target.trim_start_matches('+');
    if digits.starts_with(country_digits) {
        digits.to_string()
    } else {
        format!("{country_digits}{digits}")
    }
}

#[async_trait]
impl NotificationProvider for Fast2Sms {
    fn name(&self) -> &str {
        "fast2sms"
    }

    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn send(&self, target: &str, message: &AlertMessage) -> Result<(), ProviderError> {
        let numbers = fast2sms_number(target, &self.country_digits);
        let payload = serde_json::json!({
            "route": "v3",
            "sender_id": "TXTIND",
            "message": message.body,
            "language": "english",
            "flash": 0,
            "numbers": numbers,
        });

        let response = self
            .client
            .post(FAST2SMS_ENDPOINT)
            .header(AUTHORIZATION, &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        let body: Fast2SmsResponse = response.json().await?;
        if !body.ok {
            let reason = match body.message.as_str() {
                Some(text) => text.to_string(),
                None => body.message.to_string(),
            };
            return Err(ProviderError::Rejected(reason));
        }

        tracing::info!(to = %mask_address(&numbers), "Alert SMS sent via Fast2SMS");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Textbelt
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TextbeltResponse {
    success: bool,
    error: Option<String>,
}

pub struct TextbeltSms {
    client: reqwest::Client,
    key: String,
}

impl TextbeltSms {
    pub fn new(client: reqwest::Client, key: impl Into<String>) -> Self {
        Self {
            client,
            key: key.into(),
        }
    }
}

fn check_textbelt_response(body: TextbeltResponse) -> Result<(), ProviderError> {
    if body.success {
        Ok(())
    } else {
        Err(ProviderError::Rejected(
            body.error.unwrap_or_else(|| "textbelt reported failure".to_string()),
        ))
    }
}

#[async_trait]
impl NotificationProvider for TextbeltSms {
    fn name(&self) -> &str {
        "textbelt"
    }

    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn send(&self, target: &str, message: &AlertMessage) -> Result<(), ProviderError> {
        let phone = target.trim_start_matches('+');
        let payload = serde_json::json!({
            "phone": phone,
            "message": message.body,
            "key": self.key,
        });

        let response = self
            .client
            .post(TEXTBELT_ENDPOINT)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        check_textbelt_response(response.json().await?)?;

        tracing::info!(to = %mask_address(phone), "Alert SMS sent via Textbelt");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
