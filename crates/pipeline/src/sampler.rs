//! Host metrics sampling.
//!
//! [`SysinfoSampler`] reads CPU, memory, disk and temperature through
//! `sysinfo`. Hosts without thermal sensors (containers, most VMs) report a
//! temperature of 0 instead of failing the sample. Readings are rounded to
//! whole numbers before they become a snapshot.

use std::time::Duration;

use async_trait::async_trait;
use hostwatch_core::error::CoreError;
use hostwatch_core::metrics::{clamp_percent, MetricsSnapshot};
use sysinfo::{Components, Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};

#[derive(Debug, thiserror::Error)]
pub enum SamplingError {
    /// The readings did not form a valid snapshot.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    /// The blocking sampling task could not complete.
    #[error("Sampling task failed: {0}")]
    Task(String),

    /// The host reported something unusable.
    #[error("Host metrics unavailable: {0}")]
    Unavailable(String),

    #[error("Sampling did not finish within {0:?}")]
    Timeout(Duration),
}

/// Source of host metrics snapshots.
#[async_trait]
pub trait MetricsSampler: Send + Sync {
    async fn sample(&self, server_id: &str) -> Result<MetricsSnapshot, SamplingError>;
}

/// Samples the local host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoSampler;

impl SysinfoSampler {
    pub fn new() -> Self {
        Self
    }
}

/// Raw readings before they become a snapshot.
#[derive(Debug, Clone, Copy)]
struct HostReadings {
    cpu_pct: f64,
    memory_pct: f64,
    disk_used_pct: f64,
    temperature_c: f64,
}

impl HostReadings {
    fn read() -> Result<Self, SamplingError> {
        let mut sys = System::new();

        // CPU usage is a delta between two refreshes.
        sys.refresh_cpu_usage();
        std::thread::sleep(MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();
        let cpu_pct = f64::from(sys.global_cpu_usage());

        sys.refresh_memory();
        let total_memory = sys.total_memory();
        if total_memory == 0 {
            return Err(SamplingError::Unavailable(
                "total memory reported as zero".to_string(),
            ));
        }
        let memory_pct = sys.used_memory() as f64 / total_memory as f64 * 100.0;

        let disks = Disks::new_with_refreshed_list();
        let (total_space, available_space) = disks
            .list()
            .iter()
            .fold((0u64, 0u64), |(total, avail), d| {
                (total + d.total_space(), avail + d.available_space())
            });
        let disk_used_pct = used_percent(total_space, available_space);

        let components = Components::new_with_refreshed_list();
        let temperature_c = hottest(components.list().iter().map(|c| c.temperature()));

        Ok(Self {
            cpu_pct,
            memory_pct,
            disk_used_pct,
            temperature_c,
        })
    }

    fn into_snapshot(self, server_id: &str) -> Result<MetricsSnapshot, SamplingError> {
        Ok(MetricsSnapshot::new(
            server_id,
            clamp_percent(self.cpu_pct).round(),
            clamp_percent(self.memory_pct).round(),
            clamp_percent(self.disk_used_pct).round(),
            self.temperature_c.round(),
        )?)
    }
}

fn used_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    total.saturating_sub(available) as f64 / total as f64 * 100.0
}

/// Highest finite sensor reading, or 0 with no sensors.
fn hottest(readings: impl Iterator<Item = f32>) -> f64 {
    readings
        .filter(|t| t.is_finite())
        .map(f64::from)
        .fold(None, |max: Option<f64>, t| Some(max.map_or(t, |m| m.max(t))))
        .unwrap_or(0.0)
}

#[async_trait]
impl MetricsSampler for SysinfoSampler {
    async fn sample(&self, server_id: &str) -> Result<MetricsSnapshot, SamplingError> {
        let readings = tokio::task::spawn_blocking(HostReadings::read)
            .await
            .map_err(|e| SamplingError::Task(e.to_string()))??;

        tracing::debug!(
            server_id,
            cpu = readings.cpu_pct,
            memory = readings.memory_pct,
            disk = readings.disk_used_pct,
            temperature = readings.temperature_c,
            "Sampled host metrics"
        );
        readings.into_snapshot(server_id)
    }
}
