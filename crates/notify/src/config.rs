use std::time::Duration;

use hostwatch_core::recipient::DEFAULT_COUNTRY_CODE;

use crate::delivery::email::{EmailConfig, SmtpEmailProvider};
use crate::delivery::push::FcmPushProvider;
use crate::delivery::sms::{Fast2Sms, TextbeltSms, TwilioConfig, TwilioSms, TEXTBELT_FREE_KEY};
use crate::dispatcher::{Dispatcher, DEFAULT_PROVIDER_TIMEOUT};
use crate::error::ProviderError;

/// Provider configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub fcm_server_key: Option<String>,
    pub twilio: Option<TwilioConfig>,
    pub fast2sms_api_key: Option<String>,
    pub textbelt_key: String,
    pub email: Option<EmailConfig>,
    /// Per-provider call timeout.
    pub provider_timeout: Duration,
    /// Prepended to phone numbers without a `+` prefix.
    pub default_country_code: String,
}

impl NotifyConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                | Required | Default      |
    /// |-------------------------|----------|--------------|
    /// | `FCM_SERVER_KEY`        | no       | push off     |
    /// | `TWILIO_ACCOUNT_SID`    | no       | Twilio off   |
    /// | `TWILIO_AUTH_TOKEN`     | no       | Twilio off   |
    /// | `TWILIO_PHONE_NUMBER`   | no       | Twilio off   |
    /// | `FAST2SMS_API_KEY`      | no       | Fast2SMS off |
    /// | `TEXTBELT_KEY`          | no       | `textbelt`   |
    /// | `PROVIDER_TIMEOUT_SECS` | no       | `10`         |
    /// | `DEFAULT_COUNTRY_CODE`  | no       | `+91`        |
    ///
    /// SMTP variables are documented on [`EmailConfig::from_env`].
    pub fn from_env() -> Self {
        let provider_timeout = std::env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT);

        Self {
            fcm_server_key: non_empty_var("FCM_SERVER_KEY"),
            twilio: TwilioConfig::from_env(),
            fast2sms_api_key: non_empty_var("FAST2SMS_API_KEY"),
            textbelt_key: non_empty_var("TEXTBELT_KEY")
                .unwrap_or_else(|| TEXTBELT_FREE_KEY.to_string()),
            email: EmailConfig::from_env(),
            provider_timeout,
            default_country_code: non_empty_var("DEFAULT_COUNTRY_CODE")
                .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
        }
    }

    /// Build a dispatcher with every configured provider.
    ///
    /// SMS order is Twilio, Fast2SMS, then Textbelt. All HTTP providers
    /// share one `reqwest` client.
    pub fn build_dispatcher(&self) -> Result<Dispatcher, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(self.provider_timeout)
            .build()?;

        let mut dispatcher = Dispatcher::new(self.provider_timeout);

        if let Some(key) = &self.fcm_server_key {
            dispatcher = dispatcher.with_push(FcmPushProvider::new(client.clone(), key.clone()));
        }
        if let Some(twilio) = &self.twilio {
            dispatcher = dispatcher.with_sms(TwilioSms::new(client.clone(), twilio.clone()));
        }
        if let Some(key) = &self.fast2sms_api_key {
            dispatcher = dispatcher.with_sms(Fast2Sms::new(
                client.clone(),
                key.clone(),
                &self.default_country_code,
            ));
        }
        dispatcher = dispatcher.with_sms(TextbeltSms::new(client, self.textbelt_key.clone()));

        if let Some(email) = &self.email {
            dispatcher = dispatcher.with_email(SmtpEmailProvider::new(email)?);
        }

        tracing::info!(
            push = self.fcm_server_key.is_some(),
            sms_chain = ?dispatcher.sms_chain(),
            email = self.email.is_some(),
            "Notification providers configured"
        );
        Ok(dispatcher)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
