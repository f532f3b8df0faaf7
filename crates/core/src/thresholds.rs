//! Threshold evaluation engine for host metrics.
//!
//! Pure logic with no I/O. The caller samples the host and passes the
//! snapshot plus the thresholds for this evaluation.

use serde::{Deserialize, Serialize};

use crate::alert::{AlertDescriptor, MetricKind};
use crate::metrics::MetricsSnapshot;

/// Default CPU usage limit in percent.
pub const DEFAULT_CPU_MAX: f64 = 80.0;
/// Default memory usage limit in percent.
pub const DEFAULT_MEMORY_MAX: f64 = 85.0;
/// Default disk usage limit in percent.
pub const DEFAULT_DISK_MAX: f64 = 75.0;
/// Default temperature limit in degrees Celsius.
pub const DEFAULT_TEMPERATURE_MAX: f64 = 70.0;

/// Message carried by the synthetic alert emitted in forced mode.
pub const FORCED_ALERT_MESSAGE: &str = "Forced test alert for debugging";

/// Upper bounds for each metric, scoped to a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdSet {
    pub cpu_max: f64,
    pub memory_max: f64,
    pub disk_max: f64,
    pub temperature_max: f64,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            cpu_max: DEFAULT_CPU_MAX,
            memory_max: DEFAULT_MEMORY_MAX,
            disk_max: DEFAULT_DISK_MAX,
            temperature_max: DEFAULT_TEMPERATURE_MAX,
        }
    }
}

impl ThresholdSet {
    /// The configured limit for `metric`, or `None` for the test metric.
    pub fn limit_for(&self, metric: MetricKind) -> Option<f64> {
        match metric {
            MetricKind::Cpu => Some(self.cpu_max),
            MetricKind::Memory => Some(self.memory_max),
            MetricKind::Disk => Some(self.disk_max),
            MetricKind::Temperature => Some(self.temperature_max),
            MetricKind::Test => None,
        }
    }
}

/// Caller-supplied threshold overrides (request parameters).
///
/// Missing, non-finite and non-positive values fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ThresholdOverrides {
    pub cpu_max: Option<f64>,
    pub memory_max: Option<f64>,
    pub disk_max: Option<f64>,
    pub temperature_max: Option<f64>,
}

impl ThresholdOverrides {
    pub fn resolve(&self) -> ThresholdSet {
        let defaults = ThresholdSet::default();
        ThresholdSet {
            cpu_max: pick(self.cpu_max, defaults.cpu_max),
            memory_max: pick(self.memory_max, defaults.memory_max),
            disk_max: pick(self.disk_max, defaults.disk_max),
            temperature_max: pick(self.temperature_max, defaults.temperature_max),
        }
    }
}

fn pick(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

/// How a cycle produces its alert set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationMode {
    /// Compare the snapshot against thresholds.
    #[default]
    Thresholds,
    /// Skip comparison and emit the single synthetic test alert.
    Forced,
}

impl EvaluationMode {
    pub fn from_forced(forced: bool) -> Self {
        if forced {
            EvaluationMode::Forced
        } else {
            EvaluationMode::Thresholds
        }
    }
}

/// Evaluate a snapshot against thresholds and return every breach.
///
/// A metric breaches when its value is strictly greater than its limit.
/// Descriptors come out in [`MetricKind::ORDERED`] order.
pub fn evaluate(snapshot: &MetricsSnapshot, thresholds: &ThresholdSet) -> Vec<AlertDescriptor> {
    let mut alerts = Vec::new();

    for metric in MetricKind::ORDERED {
        let observed = observed_value(snapshot, metric);
        let Some(limit) = thresholds.limit_for(metric) else {
            continue;
        };
        if observed > limit {
            alerts.push(AlertDescriptor {
                metric,
                observed_value: observed,
                threshold_value: limit,
                message: breach_message(metric, observed),
            });
        }
    }

    alerts
}

/// Evaluate according to `mode`.
pub fn evaluate_with_mode(
    snapshot: &MetricsSnapshot,
    thresholds: &ThresholdSet,
    mode: EvaluationMode,
) -> Vec<AlertDescriptor> {
    match mode {
        EvaluationMode::Thresholds => evaluate(snapshot, thresholds),
        EvaluationMode::Forced => vec![forced_alert()],
    }
}

/// The synthetic descriptor used to exercise the delivery path.
pub fn forced_alert() -> AlertDescriptor {
    AlertDescriptor {
        metric: MetricKind::Test,
        observed_value: 0.0,
        threshold_value: 0.0,
        message: FORCED_ALERT_MESSAGE.to_string(),
    }
}

fn observed_value(snapshot: &MetricsSnapshot, metric: MetricKind) -> f64 {
    match metric {
        MetricKind::Cpu => snapshot.cpu_pct(),
        MetricKind::Memory => snapshot.memory_pct(),
        MetricKind::Disk => snapshot.disk_used_pct(),
        MetricKind::Temperature => snapshot.temperature_c(),
        MetricKind::Test => 0.0,
    }
}

/// Render the human-readable message for a breach.
fn breach_message(metric: MetricKind, value: f64) -> String {
    let unit = metric.unit();
    let value = display_value(value);
    match metric {
        MetricKind::Cpu => format!("High CPU usage: {value}{unit}"),
        MetricKind::Memory => format!("High memory usage: {value}{unit}"),
        MetricKind::Disk => format!("High disk usage: {value}{unit}"),
        MetricKind::Temperature => format!("High temperature: {value}{unit}"),
        MetricKind::Test => FORCED_ALERT_MESSAGE.to_string(),
    }
}

/// Round to one decimal place so float noise never reaches a notification.
///
/// Whole numbers print without a fractional part.
pub fn display_value(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(cpu: f64, memory: f64, disk: f64, temp: f64) -> MetricsSnapshot {
        MetricsSnapshot::new("local", cpu, memory, disk, temp).unwrap()
    }

    #[test]
    fn no_alerts_when_within_thresholds() {
        let alerts = evaluate(&snapshot(50.0, 40.0, 30.0, 45.0), &ThresholdSet::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn value_equal_to_threshold_does_not_alert() {
        let alerts = evaluate(&snapshot(80.0, 85.0, 75.0, 70.0), &ThresholdSet::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn high_cpu_produces_single_descriptor() {
        let alerts = evaluate(&snapshot(92.0, 40.0, 30.0, 45.0), &ThresholdSet::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].metric, MetricKind::Cpu);
        assert_eq!(alerts[0].observed_value, 92.0);
        assert_eq!(alerts[0].threshold_value, 80.0);
        assert_eq!(alerts[0].message, "High CPU usage: 92%");
    }

    #[test]
    fn all_metrics_breached_in_fixed_order() {
        let alerts = evaluate(&snapshot(99.0, 95.0, 90.0, 88.0), &ThresholdSet::default());
        let order: Vec<MetricKind> = alerts.iter().map(|a| a.metric).collect();
        assert_eq!(order, MetricKind::ORDERED.to_vec());
        assert_eq!(alerts[1].message, "High memory usage: 95%");
        assert_eq!(alerts[2].message, "High disk usage: 90%");
        assert_eq!(alerts[3].message, "High temperature: 88°C");
    }

    #[test]
    fn fractional_values_render_with_decimals() {
        let alerts = evaluate(&snapshot(81.5, 10.0, 10.0, 10.0), &ThresholdSet::default());
        assert_eq!(alerts[0].message, "High CPU usage: 81.5%");
    }

    #[test]
    fn float_noise_is_rounded_out_of_messages() {
        let cpu = f64::from(92.3f32);
        let memory = 7e9 / 8_000_000_007.0 * 100.0;
        let alerts = evaluate(&snapshot(cpu, memory, 10.0, 10.0), &ThresholdSet::default());

        assert_eq!(alerts[0].message, "High CPU usage: 92.3%");
        assert_eq!(alerts[1].message, "High memory usage: 87.5%");
        assert_eq!(alerts[0].observed_value, cpu);
    }

    #[test]
    fn display_value_keeps_whole_numbers_whole() {
        assert_eq!(display_value(92.0).to_string(), "92");
        assert_eq!(display_value(80.04).to_string(), "80");
        assert_eq!(display_value(-0.01).to_string(), "0");
    }

    #[test]
    fn custom_thresholds_apply() {
        let thresholds = ThresholdOverrides {
            memory_max: Some(30.0),
            ..Default::default()
        }
        .resolve();
        let alerts = evaluate(&snapshot(50.0, 40.0, 30.0, 45.0), &thresholds);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].metric, MetricKind::Memory);
        assert_eq!(alerts[0].threshold_value, 30.0);
    }

    #[test]
    fn invalid_overrides_fall_back_to_defaults() {
        let thresholds = ThresholdOverrides {
            cpu_max: Some(0.0),
            memory_max: Some(f64::NAN),
            disk_max: Some(-5.0),
            temperature_max: None,
        }
        .resolve();
        assert_eq!(thresholds, ThresholdSet::default());
    }

    #[test]
    fn forced_mode_ignores_values() {
        let alerts = evaluate_with_mode(
            &snapshot(1.0, 1.0, 1.0, 1.0),
            &ThresholdSet::default(),
            EvaluationMode::Forced,
        );
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].is_test());
        assert_eq!(alerts[0].message, FORCED_ALERT_MESSAGE);
    }

    #[test]
    fn forced_mode_emits_one_alert_even_when_breached() {
        let alerts = evaluate_with_mode(
            &snapshot(99.0, 99.0, 99.0, 99.0),
            &ThresholdSet::default(),
            EvaluationMode::from_forced(true),
        );
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].metric, MetricKind::Test);
    }
}
