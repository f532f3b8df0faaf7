//! Multi-channel alert dispatch.
//!
//! Push goes first. If it does not succeed, the SMS providers are tried in
//! registration order until one succeeds. Email runs alongside the push/SMS
//! branch and never affects its outcome.

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use hostwatch_core::alert::AlertDescriptor;
use hostwatch_core::recipient::Recipient;
use serde::Serialize;

use crate::error::ProviderError;
use crate::provider::{AlertMessage, Channel, NotificationAttempt, NotificationProvider};

/// Default upper bound on each provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Aggregate result of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryOutcome {
    pub delivered_via_push: bool,
    pub delivered_via_sms: bool,
    pub delivered_via_email: bool,
    /// Name of the SMS provider that succeeded, if any.
    pub sms_provider: Option<String>,
    pub attempts: Vec<NotificationAttempt>,
}

impl DeliveryOutcome {
    /// Whether the alert reached the recipient's phone (push or SMS).
    pub fn delivered(&self) -> bool {
        self.delivered_via_push || self.delivered_via_sms
    }

    fn from_attempts(attempts: impl IntoIterator<Item = NotificationAttempt>) -> Self {
        let mut outcome = DeliveryOutcome::default();
        for attempt in attempts {
            if attempt.is_sent() {
                match attempt.channel {
                    Channel::Push => outcome.delivered_via_push = true,
                    Channel::Sms => {
                        outcome.delivered_via_sms = true;
                        outcome.sms_provider = Some(attempt.provider.clone());
                    }
                    Channel::Email => outcome.delivered_via_email = true,
                }
            }
            outcome.attempts.push(attempt);
        }
        outcome
    }
}

/// Which providers a dispatcher will try, by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProviderSummary {
    pub push: Option<String>,
    pub sms: Vec<String>,
    pub email: Option<String>,
}

impl ProviderSummary {
    /// Whether at least one channel is configured.
    pub fn can_notify(&self) -> bool {
        self.push.is_some() || !self.sms.is_empty() || self.email.is_some()
    }
}

/// Routes one combined alert message through the configured providers.
pub struct Dispatcher {
    push: Option<Box<dyn NotificationProvider>>,
    sms: Vec<Box<dyn NotificationProvider>>,
    email: Option<Box<dyn NotificationProvider>>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            push: None,
            sms: Vec::new(),
            email: None,
            timeout,
        }
    }

    pub fn with_push(mut self, provider: impl NotificationProvider + 'static) -> Self {
        self.push = Some(Box::new(provider));
        self
    }

    /// Append an SMS provider to the end of the fallback chain.
    pub fn with_sms(mut self, provider: impl NotificationProvider + 'static) -> Self {
        self.sms.push(Box::new(provider));
        self
    }

    pub fn with_email(mut self, provider: impl NotificationProvider + 'static) -> Self {
        self.email = Some(Box::new(provider));
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Names of the SMS providers in the order they are tried.
    pub fn sms_chain(&self) -> Vec<&str> {
        self.sms.iter().map(|p| p.name()).collect()
    }

    pub fn providers(&self) -> ProviderSummary {
        ProviderSummary {
            push: self.push.as_ref().map(|p| p.name().to_string()),
            sms: self.sms.iter().map(|p| p.name().to_string()).collect(),
            email: self.email.as_ref().map(|p| p.name().to_string()),
        }
    }

    /// Deliver `alerts` to `recipient` over every applicable channel.
    ///
    /// Never fails: each provider error, timeout or panic is recorded as a
    /// failed attempt in the returned outcome.
    pub async fn dispatch(&self, recipient: &Recipient, alerts: &[AlertDescriptor]) -> DeliveryOutcome {
        let message = AlertMessage::for_alerts(&recipient.display_name, alerts);
        self.dispatch_message(recipient, &message).await
    }

    /// Deliver an already rendered message over push, SMS and email.
    pub async fn dispatch_message(&self, recipient: &Recipient, message: &AlertMessage) -> DeliveryOutcome {
        let (phone_attempts, email_attempt) = tokio::join!(
            self.deliver_to_phone(recipient, message),
            self.deliver_email(recipient, message),
        );

        let outcome = DeliveryOutcome::from_attempts(phone_attempts.into_iter().chain(email_attempt));

        tracing::info!(
            push = outcome.delivered_via_push,
            sms = outcome.delivered_via_sms,
            email = outcome.delivered_via_email,
            sms_provider = outcome.sms_provider.as_deref(),
            attempts = outcome.attempts.len(),
            "Alert dispatch finished"
        );
        outcome
    }

    /// Deliver a message over the SMS chain only.
    pub async fn dispatch_sms(&self, recipient: &Recipient, message: &AlertMessage) -> DeliveryOutcome {
        let outcome = DeliveryOutcome::from_attempts(self.deliver_sms(recipient, message).await);
        tracing::info!(
            sms = outcome.delivered_via_sms,
            sms_provider = outcome.sms_provider.as_deref(),
            attempts = outcome.attempts.len(),
            "SMS dispatch finished"
        );
        outcome
    }

    /// Push, then the SMS chain if push did not succeed.
    async fn deliver_to_phone(
        &self,
        recipient: &Recipient,
        message: &AlertMessage,
    ) -> Vec<NotificationAttempt> {
        let mut attempts = Vec::new();

        match (&self.push, recipient.push_token.as_deref()) {
            (Some(provider), Some(token)) => {
                let attempt = self.attempt(provider.as_ref(), token, message).await;
                let sent = attempt.is_sent();
                attempts.push(attempt);
                if sent {
                    return attempts;
                }
            }
            (Some(provider), None) => {
                attempts.push(NotificationAttempt::skipped(
                    Channel::Push,
                    provider.name(),
                    "recipient has no push token",
                ));
            }
            (None, _) => {}
        }

        attempts.extend(self.deliver_sms(recipient, message).await);

        if !attempts.iter().any(NotificationAttempt::is_sent) {
            tracing::warn!("All push and SMS providers failed");
        }
        attempts
    }

    /// The SMS chain in order, stopping at the first success.
    async fn deliver_sms(&self, recipient: &Recipient, message: &AlertMessage) -> Vec<NotificationAttempt> {
        let Some(phone) = recipient.phone.as_deref() else {
            return self
                .sms
                .iter()
                .map(|provider| {
                    NotificationAttempt::skipped(
                        Channel::Sms,
                        provider.name(),
                        "recipient has no phone number",
                    )
                })
                .collect();
        };

        let mut attempts = Vec::new();
        for provider in &self.sms {
            let attempt = self.attempt(provider.as_ref(), phone, message).await;
            let sent = attempt.is_sent();
            attempts.push(attempt);
            if sent {
                break;
            }
        }
        attempts
    }

    async fn deliver_email(
        &self,
        recipient: &Recipient,
        message: &AlertMessage,
    ) -> Option<NotificationAttempt> {
        let provider = self.email.as_ref()?;
        match recipient.email.as_deref() {
            Some(address) => Some(self.attempt(provider.as_ref(), address, message).await),
            None => Some(NotificationAttempt::skipped(
                Channel::Email,
                provider.name(),
                "recipient has no email address",
            )),
        }
    }

    /// One bounded, panic-isolated provider call.
    async fn attempt(
        &self,
        provider: &dyn NotificationProvider,
        target: &str,
        message: &AlertMessage,
    ) -> NotificationAttempt {
        let channel = provider.channel();
        let name = provider.name();

        let call = AssertUnwindSafe(provider.send(target, message)).catch_unwind();
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(_panic)) => Err(ProviderError::Panicked),
            Err(_elapsed) => Err(ProviderError::Timeout(self.timeout)),
        };

        match result {
            Ok(()) => {
                tracing::debug!(provider = name, ?channel, "Provider delivered alert");
                NotificationAttempt::sent(channel, name)
            }
            Err(e) => {
                tracing::warn!(provider = name, ?channel, error = %e, "Provider failed");
                NotificationAttempt::failed(channel, name, &e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use hostwatch_core::alert::MetricKind;

    use super::*;
    use crate::provider::AttemptOutcome;

    #[derive(Clone, Copy)]
    enum Behaviour {
        Succeed,
        Fail,
        Hang,
        Panic,
    }

    struct MockProvider {
        name: &'static str,
        channel: Channel,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl MockProvider {
        fn new(name: &'static str, channel: Channel, behaviour: Behaviour) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let provider = Self {
                name,
                channel,
                behaviour,
                calls: Arc::clone(&calls),
            };
            (provider, calls)
        }
    }

    #[async_trait]
    impl NotificationProvider for MockProvider {
        fn name(&self) -> &str {
            self.name
        }

        fn channel(&self) -> Channel {
            self.channel
        }

        async fn send(&self, _target: &str, _message: &AlertMessage) -> Result<(), ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Succeed => Ok(()),
                Behaviour::Fail => Err(ProviderError::HttpStatus(500)),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok(())
                }
                Behaviour::Panic => panic!("provider blew up"),
            }
        }
    }

    fn recipient() -> Recipient {
        Recipient {
            display_name: "Asha".into(),
            phone: Some("+919985252395".into()),
            email: Some("asha@example.com".into()),
            push_token: Some("device-token".into()),
        }
    }

    fn alerts() -> Vec<AlertDescriptor> {
        vec![AlertDescriptor {
            metric: MetricKind::Cpu,
            observed_value: 92.0,
            threshold_value: 80.0,
            message: "High CPU usage: 92%".into(),
        }]
    }

    #[tokio::test]
    async fn push_success_skips_sms() {
        let (push, push_calls) = MockProvider::new("fcm", Channel::Push, Behaviour::Succeed);
        let (sms, sms_calls) = MockProvider::new("twilio", Channel::Sms, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_push(push)
            .with_sms(sms);

        let outcome = dispatcher.dispatch(&recipient(), &alerts()).await;

        assert!(outcome.delivered_via_push);
        assert!(!outcome.delivered_via_sms);
        assert_eq!(push_calls.load(Ordering::SeqCst), 1);
        assert_eq!(sms_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sms_chain_stops_at_first_success() {
        let (a, a_calls) = MockProvider::new("twilio", Channel::Sms, Behaviour::Fail);
        let (b, b_calls) = MockProvider::new("fast2sms", Channel::Sms, Behaviour::Succeed);
        let (c, c_calls) = MockProvider::new("textbelt", Channel::Sms, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_sms(a)
            .with_sms(b)
            .with_sms(c);

        let mut to = recipient();
        to.push_token = None;
        let outcome = dispatcher.dispatch(&to, &alerts()).await;

        assert!(outcome.delivered_via_sms);
        assert_eq!(outcome.sms_provider.as_deref(), Some("fast2sms"));
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.attempts[0].outcome, AttemptOutcome::Failed);
        assert_eq!(outcome.attempts[1].outcome, AttemptOutcome::Sent);
    }

    #[tokio::test]
    async fn push_failure_falls_through_to_sms() {
        let (push, _) = MockProvider::new("fcm", Channel::Push, Behaviour::Fail);
        let (sms, sms_calls) = MockProvider::new("twilio", Channel::Sms, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_push(push)
            .with_sms(sms);

        let outcome = dispatcher.dispatch(&recipient(), &alerts()).await;

        assert!(!outcome.delivered_via_push);
        assert!(outcome.delivered_via_sms);
        assert_eq!(sms_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_providers_failing_is_not_delivered() {
        let (push, _) = MockProvider::new("fcm", Channel::Push, Behaviour::Fail);
        let (a, _) = MockProvider::new("twilio", Channel::Sms, Behaviour::Fail);
        let (b, _) = MockProvider::new("fast2sms", Channel::Sms, Behaviour::Fail);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_push(push)
            .with_sms(a)
            .with_sms(b);

        let outcome = dispatcher.dispatch(&recipient(), &alerts()).await;

        assert!(!outcome.delivered());
        assert_eq!(outcome.sms_provider, None);
        assert_eq!(outcome.attempts.len(), 3);
        assert!(outcome
            .attempts
            .iter()
            .all(|a| a.outcome == AttemptOutcome::Failed));
    }

    #[tokio::test]
    async fn email_result_does_not_change_phone_flags() {
        let (sms, _) = MockProvider::new("twilio", Channel::Sms, Behaviour::Fail);
        let (email, email_calls) = MockProvider::new("smtp", Channel::Email, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_sms(sms)
            .with_email(email);

        let outcome = dispatcher.dispatch(&recipient(), &alerts()).await;

        assert!(outcome.delivered_via_email);
        assert!(!outcome.delivered());
        assert_eq!(email_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn email_failure_leaves_sms_delivery_intact() {
        let (sms, _) = MockProvider::new("twilio", Channel::Sms, Behaviour::Succeed);
        let (email, _) = MockProvider::new("smtp", Channel::Email, Behaviour::Fail);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_sms(sms)
            .with_email(email);

        let outcome = dispatcher.dispatch(&recipient(), &alerts()).await;

        assert!(outcome.delivered_via_sms);
        assert!(!outcome.delivered_via_email);
        let email_attempt = outcome
            .attempts
            .iter()
            .find(|a| a.channel == Channel::Email)
            .unwrap();
        assert_eq!(email_attempt.outcome, AttemptOutcome::Failed);
    }

    #[tokio::test]
    async fn hanging_provider_times_out_and_chain_continues() {
        let (a, _) = MockProvider::new("twilio", Channel::Sms, Behaviour::Hang);
        let (b, b_calls) = MockProvider::new("fast2sms", Channel::Sms, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(Duration::from_millis(20))
            .with_sms(a)
            .with_sms(b);

        let outcome = dispatcher.dispatch(&recipient(), &alerts()).await;

        assert_eq!(outcome.sms_provider.as_deref(), Some("fast2sms"));
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert!(outcome.attempts[0]
            .error_detail
            .as_deref()
            .unwrap()
            .contains("timed out"));
    }

    #[tokio::test]
    async fn panicking_provider_counts_as_failed() {
        let (a, _) = MockProvider::new("twilio", Channel::Sms, Behaviour::Panic);
        let (b, _) = MockProvider::new("fast2sms", Channel::Sms, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_sms(a)
            .with_sms(b);

        let outcome = dispatcher.dispatch(&recipient(), &alerts()).await;

        assert_eq!(outcome.attempts[0].outcome, AttemptOutcome::Failed);
        assert_eq!(
            outcome.attempts[0].error_detail.as_deref(),
            Some("Provider panicked during send")
        );
        assert!(outcome.delivered_via_sms);
    }

    #[tokio::test]
    async fn missing_addresses_are_skipped() {
        let (push, push_calls) = MockProvider::new("fcm", Channel::Push, Behaviour::Succeed);
        let (sms, sms_calls) = MockProvider::new("twilio", Channel::Sms, Behaviour::Succeed);
        let (email, email_calls) = MockProvider::new("smtp", Channel::Email, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_push(push)
            .with_sms(sms)
            .with_email(email);

        let nobody = Recipient {
            display_name: "Asha".into(),
            phone: None,
            email: None,
            push_token: None,
        };
        let outcome = dispatcher.dispatch(&nobody, &alerts()).await;

        assert!(!outcome.delivered());
        assert_eq!(push_calls.load(Ordering::SeqCst), 0);
        assert_eq!(sms_calls.load(Ordering::SeqCst), 0);
        assert_eq!(email_calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.attempts.len(), 3);
        assert!(outcome
            .attempts
            .iter()
            .all(|a| a.outcome == AttemptOutcome::Skipped));
    }

    #[tokio::test]
    async fn sms_only_dispatch_never_touches_push_or_email() {
        let (push, push_calls) = MockProvider::new("fcm", Channel::Push, Behaviour::Succeed);
        let (a, _) = MockProvider::new("twilio", Channel::Sms, Behaviour::Fail);
        let (b, b_calls) = MockProvider::new("fast2sms", Channel::Sms, Behaviour::Succeed);
        let (email, email_calls) = MockProvider::new("smtp", Channel::Email, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_push(push)
            .with_sms(a)
            .with_sms(b)
            .with_email(email);

        let message = AlertMessage::informational("System Status - Temp: 45°C");
        let outcome = dispatcher.dispatch_sms(&recipient(), &message).await;

        assert!(outcome.delivered_via_sms);
        assert_eq!(outcome.sms_provider.as_deref(), Some("fast2sms"));
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(push_calls.load(Ordering::SeqCst), 0);
        assert_eq!(email_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rendered_message_reaches_every_channel() {
        let (push, push_calls) = MockProvider::new("fcm", Channel::Push, Behaviour::Fail);
        let (sms, sms_calls) = MockProvider::new("twilio", Channel::Sms, Behaviour::Succeed);
        let (email, email_calls) = MockProvider::new("smtp", Channel::Email, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_push(push)
            .with_sms(sms)
            .with_email(email);

        let message = AlertMessage::manual("Asha", "Backup job failed");
        let outcome = dispatcher.dispatch_message(&recipient(), &message).await;

        assert!(outcome.delivered_via_sms);
        assert!(outcome.delivered_via_email);
        assert_eq!(push_calls.load(Ordering::SeqCst), 1);
        assert_eq!(sms_calls.load(Ordering::SeqCst), 1);
        assert_eq!(email_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn provider_summary_lists_configured_channels() {
        let (sms, _) = MockProvider::new("textbelt", Channel::Sms, Behaviour::Succeed);
        let (email, _) = MockProvider::new("smtp", Channel::Email, Behaviour::Succeed);
        let summary = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_sms(sms)
            .with_email(email)
            .providers();

        assert_eq!(summary.push, None);
        assert_eq!(summary.sms, vec!["textbelt".to_string()]);
        assert_eq!(summary.email.as_deref(), Some("smtp"));
        assert!(summary.can_notify());
        assert!(!Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT).providers().can_notify());
    }

    #[test]
    fn sms_chain_preserves_registration_order() {
        let (a, _) = MockProvider::new("twilio", Channel::Sms, Behaviour::Succeed);
        let (b, _) = MockProvider::new("fast2sms", Channel::Sms, Behaviour::Succeed);
        let (c, _) = MockProvider::new("textbelt", Channel::Sms, Behaviour::Succeed);
        let dispatcher = Dispatcher::new(DEFAULT_PROVIDER_TIMEOUT)
            .with_sms(a)
            .with_sms(b)
            .with_sms(c);

        assert_eq!(dispatcher.sms_chain(), vec!["twilio", "fast2sms", "textbelt"]);
    }
}
