use std::time::Duration;

use hostwatch_core::metrics::DEFAULT_SERVER_ID;
use hostwatch_core::recipient::Recipient;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long shutdown waits for background tasks, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Bound on sampling, recipient lookup and each store write, in seconds (default: `30`).
    pub step_timeout_secs: u64,
    /// HS256 secret for session tokens. Session resolution is off when unset.
    pub jwt_secret: Option<String>,
    /// Scheduled monitoring loop.
    pub monitor: MonitorConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `STEP_TIMEOUT_SECS`    | `30`                       |
    /// | `JWT_SECRET`           | unset (sessions ignored)   |
    ///
    /// `MONITOR_*` variables are documented on [`MonitorConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let step_timeout_secs: u64 = std::env::var("STEP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("STEP_TIMEOUT_SECS must be a valid u64");

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            step_timeout_secs,
            jwt_secret,
            monitor: MonitorConfig::from_env(),
        }
    }
}

/// Default interval between scheduled cycles.
const DEFAULT_MONITOR_INTERVAL_SECS: u64 = 60;

/// Settings for the scheduled monitoring loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub server_id: String,
    /// Who scheduled alerts go to. Without one, alerts are recorded as
    /// undelivered.
    pub recipient: Option<Recipient>,
}

impl MonitorConfig {
    /// Load monitor settings from environment variables.
    ///
    /// | Env Var                   | Default   |
    /// |---------------------------|-----------|
    /// | `MONITOR_ENABLED`         | `false`   |
    /// | `MONITOR_INTERVAL_SECS`   | `60`      |
    /// | `MONITOR_SERVER_ID`       | `local`   |
    /// | `MONITOR_RECIPIENT_NAME`  | `User`    |
    /// | `MONITOR_RECIPIENT_PHONE` | --        |
    /// | `MONITOR_RECIPIENT_EMAIL` | --        |
    pub fn from_env() -> Self {
        let enabled = std::env::var("MONITOR_ENABLED")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let interval_secs: u64 = std::env::var("MONITOR_INTERVAL_SECS")
            .unwrap_or_else(|_| DEFAULT_MONITOR_INTERVAL_SECS.to_string())
            .parse()
            .expect("MONITOR_INTERVAL_SECS must be a valid u64");
        assert!(interval_secs > 0, "MONITOR_INTERVAL_SECS must be positive");

        let server_id =
            std::env::var("MONITOR_SERVER_ID").unwrap_or_else(|_| DEFAULT_SERVER_ID.into());

        let phone = std::env::var("MONITOR_RECIPIENT_PHONE").ok();
        let email = std::env::var("MONITOR_RECIPIENT_EMAIL").ok();
        let recipient = (phone.is_some() || email.is_some()).then(|| Recipient {
            display_name: std::env::var("MONITOR_RECIPIENT_NAME").unwrap_or_default(),
            phone,
            email,
            push_token: None,
        });

        Self {
            enabled,
            interval: Duration::from_secs(interval_secs),
            server_id,
            recipient,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::from_secs(DEFAULT_MONITOR_INTERVAL_SECS),
            server_id: DEFAULT_SERVER_ID.to_string(),
            recipient: None,
        }
    }
}
