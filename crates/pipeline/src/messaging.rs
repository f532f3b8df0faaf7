//! On-demand sends outside the threshold cycle.
//!
//! A status report goes over the SMS chain only: either the caller's text or a
//! freshly sampled status summary. A manual alert is logged first and then
//! delivered over push, SMS and email like a threshold alert. Both write one
//! notification history row per provider attempt.

use std::sync::Arc;

use chrono::Utc;
use hostwatch_core::log_type::LogType;
use hostwatch_core::metrics::validate_server_id;
use hostwatch_core::notification::NotificationKind;
use hostwatch_core::recipient::Recipient;
use hostwatch_notify::{AlertMessage, DeliveryOutcome};
use serde::Serialize;

use crate::orchestrator::{CycleError, Pipeline};
use crate::store::LogRecord;

/// Inputs for a status report.
#[derive(Debug, Clone, Default)]
pub struct StatusRequest {
    pub server_id: String,
    /// Sent verbatim when present and not blank; otherwise the host is sampled.
    pub text: Option<String>,
    pub recipient_override: Option<Recipient>,
    pub session_token: Option<String>,
}

/// Inputs for an operator-raised alert.
#[derive(Debug, Clone, Default)]
pub struct ManualAlertRequest {
    pub server_id: String,
    pub message: String,
    pub recipient_override: Option<Recipient>,
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageState {
    Unreachable,
    Complete,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageReport {
    pub state: MessageState,
    pub kind: NotificationKind,
    /// The text handed to providers; absent when nothing was sent.
    pub body: Option<String>,
    pub outcome: Option<DeliveryOutcome>,
    /// False when any write failed.
    pub persisted: bool,
}

impl MessageReport {
    fn unreachable(kind: NotificationKind, persisted: bool) -> Self {
        Self {
            state: MessageState::Unreachable,
            kind,
            body: None,
            outcome: None,
            persisted,
        }
    }
}

impl Pipeline {
    /// Text a status message to the recipient's phone.
    pub async fn send_status_report(
        &self,
        request: StatusRequest,
    ) -> Result<MessageReport, CycleError> {
        validate_server_id(&request.server_id)
            .map_err(|e| CycleError::Validation(e.to_string()))?;

        let custom = request
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        let kind = match custom {
            Some(_) => NotificationKind::Message,
            None => NotificationKind::Status,
        };

        let recipient = self
            .resolve_recipient(
                request.recipient_override.as_ref(),
                request.session_token.as_deref(),
            )
            .await
            .filter(|r| r.phone.is_some());
        let Some(recipient) = recipient else {
            tracing::warn!(server_id = %request.server_id, %kind, "No phone to send status to");
            return Ok(MessageReport::unreachable(kind, true));
        };

        let (body, sample_persisted) = match custom {
            Some(text) => (text, true),
            None => {
                let snapshot = self.sample(&request.server_id).await?;
                let persisted = self.recorder.record_sample(&snapshot).await;
                (snapshot.status_summary(), persisted)
            }
        };

        let dispatcher = Arc::clone(&self.dispatcher);
        let recorder = self.recorder.clone();
        let server_id = request.server_id;

        let handle = tokio::spawn(async move {
            let message = AlertMessage::informational(body);
            let outcome = dispatcher.dispatch_sms(&recipient, &message).await;

            let log = LogRecord {
                server_id: server_id.clone(),
                log_type: LogType::Command,
                message: message.body.clone(),
                payload: serde_json::json!({
                    "kind": kind,
                    "delivered": outcome.delivered_via_sms,
                }),
                recorded_at: Utc::now(),
            };
            let log_persisted = recorder.record_log(&log).await;
            let history_persisted = recorder
                .record_notifications(&server_id, kind, &recipient, &message.body, &outcome)
                .await;

            MessageReport {
                state: MessageState::Complete,
                kind,
                body: Some(message.body),
                outcome: Some(outcome),
                persisted: sample_persisted && log_persisted && history_persisted,
            }
        });

        handle
            .await
            .map_err(|e| CycleError::Internal(format!("status task failed: {e}")))
    }

    /// Log an operator alert and deliver it over every channel.
    pub async fn send_manual_alert(
        &self,
        request: ManualAlertRequest,
    ) -> Result<MessageReport, CycleError> {
        validate_server_id(&request.server_id)
            .map_err(|e| CycleError::Validation(e.to_string()))?;
        let text = request.message.trim();
        if text.is_empty() {
            return Err(CycleError::Validation("Alert message must not be blank".into()));
        }

        let log = LogRecord {
            server_id: request.server_id.clone(),
            log_type: LogType::Alert,
            message: text.to_string(),
            payload: serde_json::json!({ "manual": true }),
            recorded_at: Utc::now(),
        };
        let log_persisted = self.recorder.record_log(&log).await;

        let Some(recipient) = self
            .resolve_recipient(
                request.recipient_override.as_ref(),
                request.session_token.as_deref(),
            )
            .await
        else {
            tracing::warn!(server_id = %request.server_id, "No reachable recipient for manual alert");
            return Ok(MessageReport::unreachable(NotificationKind::Manual, log_persisted));
        };

        let message = AlertMessage::manual(&recipient.display_name, text);
        let dispatcher = Arc::clone(&self.dispatcher);
        let recorder = self.recorder.clone();
        let server_id = request.server_id;

        let handle = tokio::spawn(async move {
            let outcome = dispatcher.dispatch_message(&recipient, &message).await;
            let history_persisted = recorder
                .record_notifications(
                    &server_id,
                    NotificationKind::Manual,
                    &recipient,
                    &message.body,
                    &outcome,
                )
                .await;

            MessageReport {
                state: MessageState::Complete,
                kind: NotificationKind::Manual,
                body: Some(message.body),
                outcome: Some(outcome),
                persisted: log_persisted && history_persisted,
            }
        });

        handle
            .await
            .map_err(|e| CycleError::Internal(format!("manual alert task failed: {e}")))
    }
}
