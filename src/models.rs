//! Data models for plant configuration, simulated sensor readings and alerts
//!
//! Defines the core data structures used throughout the application.
//! Wire casing is camelCase to match the dashboard frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User-defined identity and alerting thresholds for one monitored plant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantConfig {
    /// Stable identifier, assigned by the engine on creation
    pub id: String,

    /// Display name
    pub name: String,

    /// Display glyph shown next to the name
    pub emoji: String,

    /// Moisture percentage below which the plant is critical
    pub critical_threshold: u8,

    /// Moisture percentage below which the plant is in warning.
    /// Assumed >= critical_threshold; not enforced here.
    pub warning_threshold: u8,
}

impl PlantConfig {
    /// Derive the health status for a moisture value against these thresholds.
    ///
    /// The critical check runs first, so a misconfigured pair
    /// (critical > warning) still classifies a low reading as critical.
    pub fn status_for(&self, moisture: u8) -> PlantStatus {
        if moisture < self.critical_threshold {
            PlantStatus::Critical
        } else if moisture < self.warning_threshold {
            PlantStatus::Warning
        } else {
            PlantStatus::Healthy
        }
    }
}

/// Derived health classification of a plant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantStatus {
    Healthy,
    Warning,
    Critical,
}

impl PlantStatus {
    /// The alert level this status maps to, if any
    pub fn alert_level(&self) -> Option<AlertLevel> {
        match self {
            PlantStatus::Healthy => None,
            PlantStatus::Warning => Some(AlertLevel::Warning),
            PlantStatus::Critical => Some(AlertLevel::Critical),
        }
    }
}

/// Severity of an alert, mirrors the non-healthy statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// One simulated instantaneous measurement. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Soil moisture (percent)
    pub moisture: u8,

    /// Air temperature (Celsius, one decimal)
    pub temperature: f64,

    /// Relative humidity (percent)
    pub humidity: u8,

    /// Ambient light (lux)
    pub light: u16,

    /// Time the reading was generated
    pub timestamp: DateTime<Utc>,
}

/// Per-plant view the dashboard renders: latest config joined with the
/// plant's current reading, bounded history and derived status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantData {
    pub config: PlantConfig,
    pub current: SensorReading,
    /// Oldest first, capped at the engine's history limit
    pub history: Vec<SensorReading>,
    pub status: PlantStatus,
}

/// A timestamped notification of a non-healthy status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique across ticks: plant id plus generation time in millis
    pub id: String,
    pub plant_id: String,
    /// Snapshot of the plant name at alert time
    pub plant_name: String,
    pub message: String,
    pub level: AlertLevel,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Build an alert for a plant whose reading crossed a threshold
    pub fn from_reading(config: &PlantConfig, level: AlertLevel, moisture: u8) -> Self {
        let now = Utc::now();
        let message = match level {
            AlertLevel::Critical => format!(
                "{} {} moisture critically low ({}%)",
                config.emoji, config.name, moisture
            ),
            AlertLevel::Warning => format!(
                "{} {} moisture below warning level ({}%)",
                config.emoji, config.name, moisture
            ),
        };

        Self {
            id: format!("{}-{}", config.id, now.timestamp_millis()),
            plant_id: config.id.clone(),
            plant_name: config.name.clone(),
            message,
            level,
            timestamp: now,
        }
    }
}

/// Input DTO for creating a plant; the engine assigns the id
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlantInput {
    #[validate(length(min = 1, max = 50, message = "Plant name must be 1-50 characters"))]
    pub name: String,

    #[validate(length(min = 1, message = "Emoji must not be empty"))]
    pub emoji: String,

    #[validate(range(max = 100, message = "Critical threshold must be between 0 and 100"))]
    pub critical_threshold: u8,

    #[validate(range(max = 100, message = "Warning threshold must be between 0 and 100"))]
    pub warning_threshold: u8,
}

/// Partial-update DTO; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PlantUpdate {
    #[validate(length(min = 1, max = 50, message = "Plant name must be 1-50 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, message = "Emoji must not be empty"))]
    pub emoji: Option<String>,

    #[validate(range(max = 100, message = "Critical threshold must be between 0 and 100"))]
    pub critical_threshold: Option<u8>,

    #[validate(range(max = 100, message = "Warning threshold must be between 0 and 100"))]
    pub warning_threshold: Option<u8>,
}

/// Read-only view handed to the presentation layer after every state change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub plants: Vec<PlantData>,
    pub alerts: Vec<Alert>,
    pub plant_configs: Vec<PlantConfig>,
}

/// WebSocket message types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    /// Fresh dashboard state after a tick
    Snapshot(DashboardSnapshot),
    /// Connection acknowledgment
    Connected { client_id: String },
    /// Error message
    Error { message: String },
    /// Heartbeat/ping
    Ping,
    /// Heartbeat/pong response
    Pong,
}

/// Client-to-server WebSocket messages; snapshots only flow outbound
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum WsClientMessage {
    Ping,
    Pong,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub tick_count: u64,
    pub connected_clients: usize,
    pub last_tick: Option<DateTime<Utc>>,
}
