//! Firebase Cloud Messaging push delivery.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::error::ProviderError;
use crate::provider::{AlertMessage, Channel, NotificationProvider};

/// Legacy FCM HTTP endpoint (server-key authentication).
const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// Notification title shown on the device.
const PUSH_TITLE: &str = "Server Alert";

/// Response body of the FCM send endpoint.
#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    failure: u32,
    #[serde(default)]
    results: Vec<FcmResult>,
}

#[derive(Debug, Deserialize)]
struct FcmResult {
    error: Option<String>,
}

/// Sends high-priority push notifications to a single device token.
pub struct FcmPushProvider {
    client: reqwest::Client,
    server_key: String,
}

impl FcmPushProvider {
    pub fn new(client: reqwest::Client, server_key: impl Into<String>) -> Self {
        Self {
            client,
            server_key: server_key.into(),
        }
    }
}

#[async_trait]
impl NotificationProvider for FcmPushProvider {
    fn name(&self) -> &str {
        "fcm"
    }

    fn channel(&self) -> Channel {
        Channel::Push
    }

    async fn send(&self, target: &str, message: &AlertMessage) -> Result<(), ProviderError> {
        let payload = serde_json::json!({
            "to": target,
            "priority": "high",
            "notification": {
                "title": PUSH_TITLE,
                "body": message.body,
                "sound": "default",
            },
        });

        let response = self
            .client
            .post(FCM_ENDPOINT)
            .header(AUTHORIZATION, format!("key={}", self.server_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpStatus(response.status().as_u16()));
        }

        let body: FcmResponse = response.json().await?;
        check_fcm_response(&body)?;

        tracing::info!("Push notification sent");
        Ok(())
    }
}

fn check_fcm_response(body: &FcmResponse) -> Result<(), ProviderError> {
    if body.failure == 0 {
        return Ok(());
    }
    let reason = body
        .results
        .iter()
        .find_map(|r| r.error.clone())
        .unwrap_or_else(|| "unknown FCM failure".to_string());
    Err(ProviderError::Rejected(reason))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn successful_response_passes() {
        let body: FcmResponse =
            serde_json::from_str(r#"{"success":1,"failure":0,"results":[{"message_id":"m1"}]}"#)
                .unwrap();
        assert!(check_fcm_response(&body).is_ok());
    }

    #[test]
    fn failure_reports_first_error() {
        let body: FcmResponse =
            serde_json::from_str(r#"{"success":0,"failure":1,"results":[{"error":"NotRegistered"}]}"#)
                .unwrap();
        assert_matches!(
            check_fcm_response(&body),
            Err(ProviderError::Rejected(reason)) if reason == "NotRegistered"
        );
    }
}
