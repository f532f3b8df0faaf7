//! Point-in-time host resource snapshot.

use chrono::Utc;
use serde::Serialize;

use crate::error::CoreError;
use crate::thresholds::display_value;
use crate::types::Timestamp;

/// Server id used when a caller does not name one.
pub const DEFAULT_SERVER_ID: &str = "local";

/// A single host metrics sample.
///
/// Fields are private so a snapshot can only be built through
/// [`MetricsSnapshot::new`], which enforces the percentage range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    server_id: String,
    cpu_pct: f64,
    memory_pct: f64,
    disk_used_pct: f64,
    temperature_c: f64,
    captured_at: Timestamp,
}

impl MetricsSnapshot {
    /// Build a snapshot captured now.
    pub fn new(
        server_id: impl Into<String>,
        cpu_pct: f64,
        memory_pct: f64,
        disk_used_pct: f64,
        temperature_c: f64,
    ) -> Result<Self, CoreError> {
        Self::with_capture_time(
            server_id,
            cpu_pct,
            memory_pct,
            disk_used_pct,
            temperature_c,
            Utc::now(),
        )
    }

    /// Build a snapshot with an explicit capture time.
    pub fn with_capture_time(
        server_id: impl Into<String>,
        cpu_pct: f64,
        memory_pct: f64,
        disk_used_pct: f64,
        temperature_c: f64,
        captured_at: Timestamp,
    ) -> Result<Self, CoreError> {
        let server_id = server_id.into();
        validate_server_id(&server_id)?;
        validate_percent("cpu_pct", cpu_pct)?;
        validate_percent("memory_pct", memory_pct)?;
        validate_percent("disk_used_pct", disk_used_pct)?;
        if !temperature_c.is_finite() {
            return Err(CoreError::Validation(
                "temperature_c must be a finite number".to_string(),
            ));
        }

        Ok(Self {
            server_id,
            cpu_pct,
            memory_pct,
            disk_used_pct,
            temperature_c,
            captured_at,
        })
    }

    pub fn server_id(&self) -> &str {
        &self.server_id
    }

    pub fn cpu_pct(&self) -> f64 {
        self.cpu_pct
    }

    pub fn memory_pct(&self) -> f64 {
        self.memory_pct
    }

    pub fn disk_used_pct(&self) -> f64 {
        self.disk_used_pct
    }

    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    pub fn captured_at(&self) -> Timestamp {
        self.captured_at
    }

    /// One-line status report, e.g.
    /// `System Status - Temp: 45°C, Disk: 30%, CPU: 92%, Memory: 40%`.
    pub fn status_summary(&self) -> String {
        format!(
            "System Status - Temp: {}°C, Disk: {}%, CPU: {}%, Memory: {}%",
            display_value(self.temperature_c),
            display_value(self.disk_used_pct),
            display_value(self.cpu_pct),
            display_value(self.memory_pct),
        )
    }
}

/// Reject empty or oversized server identifiers.
pub fn validate_server_id(server_id: &str) -> Result<(), CoreError> {
    if server_id.trim().is_empty() {
        return Err(CoreError::Validation("server_id must not be empty".to_string()));
    }
    if server_id.len() > 128 {
        return Err(CoreError::Validation(
            "server_id must be at most 128 characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_percent(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{field} must be between 0 and 100, got {value}"
        )));
    }
    Ok(())
}

/// Clamp a raw reading into the `[0, 100]` percentage range.
///
/// NaN readings become `0.0`.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
