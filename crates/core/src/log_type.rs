//! Well-known `logs.log_type` values.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Metrics,
    Alert,
    Command,
}

impl LogType {
    pub fn as_str(self) -> &'static str {
        match self {
            LogType::Metrics => "metrics",
            LogType::Alert => "alert",
            LogType::Command => "command",
        }
    }
}

impl std::fmt::Display for LogType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
