//! One end-to-end alert cycle.
//!
//! ```text
//! sample -> record sample -> evaluate -> no alerts?          -> NoAlert
//!                                     -> resolve recipient -> nobody?  -> record (undelivered) -> Unreachable
//!                                                          -> dispatch -> record                -> Complete
//! ```
//!
//! Dispatch and its recording run in one spawned task, so once delivery has
//! started the records are written even if the caller stops waiting.
//! Sampling, recipient lookup and every store write are bounded by the
//! pipeline's step timeout.

use std::sync::Arc;
use std::time::Duration;

use hostwatch_core::alert::{AlertDescriptor, AlertRecord};
use hostwatch_core::metrics::{validate_server_id, MetricsSnapshot};
use hostwatch_core::notification::NotificationKind;
use hostwatch_core::recipient::{Recipient, DEFAULT_COUNTRY_CODE};
use hostwatch_core::thresholds::{evaluate_with_mode, EvaluationMode, ThresholdSet};
use hostwatch_notify::{AlertMessage, DeliveryOutcome, Dispatcher, ProviderSummary};
use serde::Serialize;

use crate::recorder::{AlertRecorder, RecordedBatch};
use crate::resolver::{RecipientResolver, ResolveError};
use crate::sampler::{MetricsSampler, SamplingError};
use crate::store::AlertStore;

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error("Invalid cycle request: {0}")]
    Validation(String),

    #[error("Cycle failed: {0}")]
    Internal(String),
}

/// Inputs for one cycle.
#[derive(Debug, Clone)]
pub struct CycleRequest {
    pub server_id: String,
    pub thresholds: ThresholdSet,
    pub mode: EvaluationMode,
    /// Explicit recipient; takes precedence over the session.
    pub recipient_override: Option<Recipient>,
    pub session_token: Option<String>,
}

impl CycleRequest {
    /// A threshold-mode cycle with default limits and no recipient.
    pub fn new(server_id: impl Into<String>) -> Self {
        Self {
            server_id: server_id.into(),
            thresholds: ThresholdSet::default(),
            mode: EvaluationMode::Thresholds,
            recipient_override: None,
            session_token: None,
        }
    }
}

/// Terminal state of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    NoAlert,
    Unreachable,
    Complete,
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub state: CycleState,
    pub snapshot: MetricsSnapshot,
    pub alerts: Vec<AlertRecord>,
    /// Present only when dispatch ran.
    pub outcome: Option<DeliveryOutcome>,
    /// False when any write in this cycle failed.
    pub persisted: bool,
}

/// Default bound on sampling, recipient lookup and each store write.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs alert cycles against shared sampler, resolver, dispatcher and store.
pub struct Pipeline {
    pub(crate) sampler: Arc<dyn MetricsSampler>,
    pub(crate) resolver: Option<Arc<dyn RecipientResolver>>,
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) recorder: AlertRecorder,
    pub(crate) country_code: String,
    pub(crate) step_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        sampler: Arc<dyn MetricsSampler>,
        dispatcher: Arc<Dispatcher>,
        store: Arc<dyn AlertStore>,
    ) -> Self {
        Self {
            sampler,
            resolver: None,
            dispatcher,
            recorder: AlertRecorder::new(store).with_timeout(DEFAULT_STEP_TIMEOUT),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            step_timeout: DEFAULT_STEP_TIMEOUT,
        }
    }

    /// Bound sampling, recipient lookup and each store write by `timeout`.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self.recorder = self.recorder.with_timeout(timeout);
        self
    }

    /// Which providers the dispatcher will try.
    pub fn providers(&self) -> ProviderSummary {
        self.dispatcher.providers()
    }

    /// Enable session-token resolution.
    pub fn with_resolver(mut self, resolver: Arc<dyn RecipientResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Country code applied to override phone numbers without a `+`.
    pub fn with_country_code(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = country_code.into();
        self
    }

    /// Sample the host once and take the snapshot through the whole cycle.
    pub async fn run_cycle(&self, request: CycleRequest) -> Result<CycleReport, CycleError> {
        validate_server_id(&request.server_id)
            .map_err(|e| CycleError::Validation(e.to_string()))?;

        let snapshot = self.sample(&request.server_id).await?;
        let sample_persisted = self.recorder.record_sample(&snapshot).await;

        let alerts = evaluate_with_mode(&snapshot, &request.thresholds, request.mode);
        if alerts.is_empty() {
            tracing::debug!(server_id = %request.server_id, "No thresholds breached");
            return Ok(CycleReport {
                state: CycleState::NoAlert,
                snapshot,
                alerts: Vec::new(),
                outcome: None,
                persisted: sample_persisted,
            });
        }

        let Some(recipient) = self
            .resolve_recipient(
                request.recipient_override.as_ref(),
                request.session_token.as_deref(),
            )
            .await
        else {
            tracing::warn!(
                server_id = %request.server_id,
                alerts = alerts.len(),
                "No reachable recipient, recording alerts as undelivered"
            );
            let batch = self
                .recorder
                .record(&snapshot, &alerts, &DeliveryOutcome::default())
                .await;
            return Ok(CycleReport {
                state: CycleState::Unreachable,
                snapshot,
                alerts: batch.alerts,
                outcome: None,
                persisted: sample_persisted && batch.persisted,
            });
        };

        let (outcome, batch) = self.deliver(snapshot.clone(), alerts, recipient).await?;

        Ok(CycleReport {
            state: CycleState::Complete,
            snapshot,
            alerts: batch.alerts,
            outcome: Some(outcome),
            persisted: sample_persisted && batch.persisted,
        })
    }

    async fn deliver(
        &self,
        snapshot: MetricsSnapshot,
        alerts: Vec<AlertDescriptor>,
        recipient: Recipient,
    ) -> Result<(DeliveryOutcome, RecordedBatch), CycleError> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let recorder = self.recorder.clone();

        let handle = tokio::spawn(async move {
            let message = AlertMessage::for_alerts(&recipient.display_name, &alerts);
            let outcome = dispatcher.dispatch_message(&recipient, &message).await;
            let mut batch = recorder.record(&snapshot, &alerts, &outcome).await;
            let history_persisted = recorder
                .record_notifications(
                    snapshot.server_id(),
                    NotificationKind::Alert,
                    &recipient,
                    &message.body,
                    &outcome,
                )
                .await;
            batch.persisted &= history_persisted;
            (outcome, batch)
        });

        handle
            .await
            .map_err(|e| CycleError::Internal(format!("delivery task failed: {e}")))
    }

    /// One snapshot, bounded by the step timeout.
    pub(crate) async fn sample(&self, server_id: &str) -> Result<MetricsSnapshot, CycleError> {
        let snapshot = tokio::time::timeout(self.step_timeout, self.sampler.sample(server_id))
            .await
            .map_err(|_| SamplingError::Timeout(self.step_timeout))??;
        Ok(snapshot)
    }

    /// Override first, then the session. Unreachable recipients count as none.
    pub(crate) async fn resolve_recipient(
        &self,
        recipient_override: Option<&Recipient>,
        session_token: Option<&str>,
    ) -> Option<Recipient> {
        if let Some(recipient) = recipient_override {
            let recipient = recipient.clone().normalized(&self.country_code);
            return recipient.is_reachable().then_some(recipient);
        }

        let token = session_token?;
        let Some(resolver) = &self.resolver else {
            tracing::debug!("Session token supplied but no resolver configured");
            return None;
        };

        let lookup = tokio::time::timeout(self.step_timeout, resolver.resolve(token))
            .await
            .unwrap_or(Err(ResolveError::Timeout(self.step_timeout)));

        match lookup {
            Ok(Some(recipient)) if recipient.is_reachable() => Some(recipient),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Recipient resolution failed");
                None
            }
        }
    }
}
