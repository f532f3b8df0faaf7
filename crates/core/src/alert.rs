//! Alert types produced by the threshold evaluator and persisted by the recorder.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// The metric an alert refers to.
///
/// `Test` marks the synthetic alert emitted in forced mode so it can never be
/// mistaken for a real breach in stored history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
    Temperature,
    Test,
}

impl MetricKind {
    /// Evaluation order for real metrics.
    pub const ORDERED: [MetricKind; 4] = [
        MetricKind::Cpu,
        MetricKind::Memory,
        MetricKind::Disk,
        MetricKind::Temperature,
    ];

    /// Canonical name stored in the `alerts.metric` column.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Cpu => "cpu",
            MetricKind::Memory => "memory",
            MetricKind::Disk => "disk",
            MetricKind::Temperature => "temperature",
            MetricKind::Test => "test",
        }
    }

    /// Unit suffix used when rendering a value.
    pub fn unit(self) -> &'static str {
        match self {
            MetricKind::Temperature => "°C",
            MetricKind::Test => "",
            _ => "%",
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One threshold breach, with its structured values and the rendered message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertDescriptor {
    pub metric: MetricKind,
    pub observed_value: f64,
    pub threshold_value: f64,
    pub message: String,
}

impl AlertDescriptor {
    pub fn is_test(&self) -> bool {
        self.metric == MetricKind::Test
    }
}

/// Durable record of one alert and whether it reached the user.
///
/// `delivered` is true when push or SMS succeeded. Email is not counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub server_id: String,
    pub metric: MetricKind,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
    pub delivered: bool,
    pub recorded_at: Timestamp,
}

impl AlertRecord {
    pub fn from_descriptor(
        server_id: &str,
        descriptor: &AlertDescriptor,
        delivered: bool,
        recorded_at: Timestamp,
    ) -> Self {
        Self {
            server_id: server_id.to_string(),
            metric: descriptor.metric,
            value: descriptor.observed_value,
            threshold: descriptor.threshold_value,
            message: descriptor.message.clone(),
            delivered,
            recorded_at,
        }
    }
}

/// Join alert messages the way they appear in notifications and log entries.
pub fn join_messages(alerts: &[AlertDescriptor]) -> String {
    alerts
        .iter()
        .map(|a| a.message.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_kind_serializes_lowercase() {
        let json = serde_json::to_value(MetricKind::Temperature).unwrap();
        assert_eq!(json, "temperature");
        assert_eq!(MetricKind::Test.to_string(), "test");
    }

    #[test]
    fn join_messages_uses_comma_separator() {
        let alerts = vec![
            AlertDescriptor {
                metric: MetricKind::Cpu,
                observed_value: 92.0,
                threshold_value: 80.0,
                message: "High CPU usage: 92%".into(),
            },
            AlertDescriptor {
                metric: MetricKind::Disk,
                observed_value: 80.0,
                threshold_value: 75.0,
                message: "High disk usage: 80%".into(),
            },
        ];
        assert_eq!(
            join_messages(&alerts),
            "High CPU usage: 92%, High disk usage: 80%"
        );
    }
}
