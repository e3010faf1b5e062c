//! Telemetry engine state
//!
//! Central state container for the application: the plant configuration
//! list, per-plant simulated telemetry, and the alert feed. All mutations
//! run to completion behind a single writer lock; the periodic tick in
//! `generator` is the only autonomous caller.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info};

use crate::generator::generate_reading;
use crate::models::{
    Alert, DashboardSnapshot, PlantConfig, PlantData, PlantInput, PlantStatus, PlantUpdate,
    SensorReading,
};

/// Readings retained per plant (ring buffer semantics)
pub const MAX_HISTORY: usize = 10;

/// Alerts retained across all plants, newest first
pub const MAX_ALERTS: usize = 50;

/// Telemetry derived for one plant; the owning config lives in `configs`
/// and is joined in at read time so edits show up immediately
#[derive(Debug, Clone)]
struct PlantTelemetry {
    current: SensorReading,
    /// Oldest first; the last entry is always `current`
    history: Vec<SensorReading>,
    status: PlantStatus,
}

/// Central application state
#[derive(Debug)]
pub struct AppState {
    /// Plant configurations, insertion order preserved, unique by id
    configs: Vec<PlantConfig>,
    /// Plant id -> derived telemetry; populated lazily on first tick
    telemetry: HashMap<String, PlantTelemetry>,
    /// Alert feed, newest first, capped at MAX_ALERTS
    alerts: VecDeque<Alert>,
    /// Application start time
    start_time: DateTime<Utc>,
    /// Completed tick count
    tick_count: u64,
    /// Time the last tick finished
    last_tick: Option<DateTime<Utc>>,
    /// Connected WebSocket clients
    connected_clients: Vec<String>,
}

/// The plant set a fresh install starts with
fn default_plants() -> Vec<PlantConfig> {
    [
        ("1", "Monstera", "🪴", 20, 35),
        ("2", "Snake Plant", "🌿", 15, 30),
        ("3", "Basil", "🌱", 30, 45),
    ]
    .into_iter()
    .map(|(id, name, emoji, critical, warning)| PlantConfig {
        id: id.to_string(),
        name: name.to_string(),
        emoji: emoji.to_string(),
        critical_threshold: critical,
        warning_threshold: warning,
    })
    .collect()
}

impl AppState {
    /// Create new application state with the default plant set
    pub fn new() -> Self {
        Self::with_configs(default_plants())
    }

    /// Create new application state with an explicit initial plant set
    pub fn with_configs(configs: Vec<PlantConfig>) -> Self {
        info!(plants = configs.len(), "Initializing telemetry state");
        Self {
            configs,
            telemetry: HashMap::new(),
            alerts: VecDeque::with_capacity(MAX_ALERTS),
            start_time: Utc::now(),
            tick_count: 0,
            last_tick: None,
            connected_clients: Vec::new(),
        }
    }

    /// Refresh telemetry for every configured plant.
    ///
    /// Generates one fresh reading per plant, rolls it into that plant's
    /// bounded history, re-derives status and emits an alert for every
    /// plant that is not healthy. A plant that stays unhealthy produces a
    /// new alert on every tick; there is no cool-down.
    pub fn tick(&mut self) {
        let ids: Vec<String> = self.configs.iter().map(|c| c.id.clone()).collect();
        for id in ids {
            self.record_reading(&id, generate_reading());
        }

        self.tick_count += 1;
        self.last_tick = Some(Utc::now());

        debug!(
            tick = self.tick_count,
            plants = self.configs.len(),
            alerts = self.alerts.len(),
            "Telemetry tick complete"
        );
    }

    /// Fold one reading into the telemetry of the plant with the given id.
    ///
    /// No-op for unknown ids. Split out from `tick` so a specific reading
    /// can be injected directly.
    pub fn record_reading(&mut self, plant_id: &str, reading: SensorReading) {
        let Some(config) = self.configs.iter().find(|c| c.id == plant_id).cloned() else {
            return;
        };

        let mut history = self
            .telemetry
            .get(plant_id)
            .map(|t| t.history.clone())
            .unwrap_or_default();
        history.push(reading.clone());
        if history.len() > MAX_HISTORY {
            let excess = history.len() - MAX_HISTORY;
            history.drain(..excess);
        }

        let status = config.status_for(reading.moisture);

        self.telemetry.insert(
            plant_id.to_string(),
            PlantTelemetry {
                current: reading.clone(),
                history,
                status,
            },
        );

        if let Some(level) = status.alert_level() {
            let alert = Alert::from_reading(&config, level, reading.moisture);
            debug!(
                plant_id = %config.id,
                alert_id = %alert.id,
                level = ?level,
                moisture = reading.moisture,
                "Raising moisture alert"
            );
            self.alerts.push_front(alert);
            self.alerts.truncate(MAX_ALERTS);
        }
    }

    /// Register a new plant. The id is assigned from the current time in
    /// milliseconds; telemetry appears on the next tick.
    pub fn add_plant(&mut self, input: PlantInput) -> PlantConfig {
        let config = PlantConfig {
            id: Utc::now().timestamp_millis().to_string(),
            name: input.name,
            emoji: input.emoji,
            critical_threshold: input.critical_threshold,
            warning_threshold: input.warning_threshold,
        };

        info!(plant_id = %config.id, name = %config.name, "Plant added");
        self.configs.push(config.clone());
        config
    }

    /// Merge the provided fields into the matching config, preserving its
    /// position. No-op for unknown ids.
    pub fn update_plant(&mut self, plant_id: &str, updates: PlantUpdate) {
        let Some(config) = self.configs.iter_mut().find(|c| c.id == plant_id) else {
            return;
        };

        if let Some(name) = updates.name {
            config.name = name;
        }
        if let Some(emoji) = updates.emoji {
            config.emoji = emoji;
        }
        if let Some(critical) = updates.critical_threshold {
            config.critical_threshold = critical;
        }
        if let Some(warning) = updates.warning_threshold {
            config.warning_threshold = warning;
        }

        info!(plant_id = %plant_id, "Plant updated");
    }

    /// Remove a plant and its telemetry. Past alerts for the plant are
    /// kept. No-op for unknown ids.
    pub fn remove_plant(&mut self, plant_id: &str) {
        let before = self.configs.len();
        self.configs.retain(|c| c.id != plant_id);
        self.telemetry.remove(plant_id);

        if self.configs.len() < before {
            info!(plant_id = %plant_id, "Plant removed");
        }
    }

    /// Drop the alert with the given id. Idempotent.
    pub fn dismiss_alert(&mut self, alert_id: &str) {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != alert_id);

        if self.alerts.len() < before {
            debug!(alert_id = %alert_id, "Alert dismissed");
        }
    }

    /// The per-plant read model, one entry per config in insertion order.
    ///
    /// Plants that have not been ticked yet get a synthesized placeholder
    /// (fresh reading, empty history, healthy) so the dashboard always has
    /// something to render.
    pub fn plants(&self) -> Vec<PlantData> {
        self.configs
            .iter()
            .map(|config| self.plant_data(config))
            .collect()
    }

    /// Read model for a single plant, if configured
    pub fn plant(&self, plant_id: &str) -> Option<PlantData> {
        self.configs
            .iter()
            .find(|c| c.id == plant_id)
            .map(|config| self.plant_data(config))
    }

    /// Reading history for a single plant, oldest first
    pub fn history(&self, plant_id: &str) -> Option<Vec<SensorReading>> {
        self.configs.iter().find(|c| c.id == plant_id)?;
        Some(
            self.telemetry
                .get(plant_id)
                .map(|t| t.history.clone())
                .unwrap_or_default(),
        )
    }

    fn plant_data(&self, config: &PlantConfig) -> PlantData {
        match self.telemetry.get(&config.id) {
            Some(telemetry) => PlantData {
                config: config.clone(),
                current: telemetry.current.clone(),
                history: telemetry.history.clone(),
                status: telemetry.status,
            },
            None => PlantData {
                config: config.clone(),
                current: generate_reading(),
                history: Vec::new(),
                status: PlantStatus::Healthy,
            },
        }
    }

    /// Current alert feed, newest first
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.iter().cloned().collect()
    }

    /// The full outbound view for the presentation layer
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            plants: self.plants(),
            alerts: self.alerts(),
            plant_configs: self.configs.clone(),
        }
    }

    /// Configured plants in insertion order
    pub fn configs(&self) -> &[PlantConfig] {
        &self.configs
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.start_time).num_seconds() as u64
    }

    /// Completed tick count
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Time the last tick finished
    pub fn last_tick(&self) -> Option<DateTime<Utc>> {
        self.last_tick
    }

    /// Register a new WebSocket client
    pub fn add_client(&mut self, client_id: String) {
        info!(client_id = %client_id, "WebSocket client connected");
        self.connected_clients.push(client_id);
    }

    /// Remove a WebSocket client
    pub fn remove_client(&mut self, client_id: &str) {
        info!(client_id = %client_id, "WebSocket client disconnected");
        self.connected_clients.retain(|id| id != client_id);
    }

    /// Get count of connected clients
    pub fn client_count(&self) -> usize {
        self.connected_clients.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertLevel;

    fn reading(moisture: u8) -> SensorReading {
        SensorReading {
            moisture,
            temperature: 22.0,
            humidity: 55,
            light: 500,
            timestamp: Utc::now(),
        }
    }

    fn input(name: &str) -> PlantInput {
        PlantInput {
            name: name.to_string(),
            emoji: "🌵".to_string(),
            critical_threshold: 20,
            warning_threshold: 35,
        }
    }

    #[test]
    fn test_starts_with_default_plants() {
        let state = AppState::new();
        let names: Vec<&str> = state.configs().iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["Monstera", "Snake Plant", "Basil"]);
        assert_eq!(state.tick_count(), 0);
        assert!(state.last_tick().is_none());
    }

    #[test]
    fn test_placeholder_before_first_tick() {
        let state = AppState::new();
        let plants = state.plants();

        assert_eq!(plants.len(), 3);
        for plant in plants {
            assert!(plant.history.is_empty());
            assert_eq!(plant.status, PlantStatus::Healthy);
        }
    }

    #[test]
    fn test_tick_populates_every_plant() {
        let mut state = AppState::new();
        state.tick();

        assert_eq!(state.tick_count(), 1);
        assert!(state.last_tick().is_some());
        for plant in state.plants() {
            assert_eq!(plant.history.len(), 1);
            assert_eq!(plant.current.moisture, plant.history[0].moisture);
        }
    }

    #[test]
    fn test_history_capped_and_chronological() {
        let mut state = AppState::new();
        // Moisture values 50..=64 are healthy for plant 1, so no alerts interfere
        for i in 0..15u8 {
            state.record_reading("1", reading(50 + i));
        }

        let history = state.history("1").unwrap();
        assert_eq!(history.len(), MAX_HISTORY);
        // Exactly the most recent readings, oldest first
        let moistures: Vec<u8> = history.iter().map(|r| r.moisture).collect();
        assert_eq!(moistures, (55..65).collect::<Vec<u8>>());

        let plant = state.plant("1").unwrap();
        assert_eq!(plant.current.moisture, 64);
    }

    #[test]
    fn test_forced_critical_reading_raises_alert() {
        // Plant 1 (Monstera) has thresholds critical=20, warning=35
        let mut state = AppState::new();
        state.record_reading("1", reading(15));

        let plant = state.plant("1").unwrap();
        assert_eq!(plant.status, PlantStatus::Critical);

        let alerts = state.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Critical);
        assert_eq!(alerts[0].plant_id, "1");
        assert!(alerts[0].message.contains("critically low (15%)"));
    }

    #[test]
    fn test_warning_reading_raises_warning_alert() {
        let mut state = AppState::new();
        state.record_reading("1", reading(25));

        assert_eq!(state.plant("1").unwrap().status, PlantStatus::Warning);
        assert_eq!(state.alerts()[0].level, AlertLevel::Warning);
    }

    #[test]
    fn test_healthy_reading_raises_no_alert() {
        let mut state = AppState::new();
        state.record_reading("1", reading(60));

        assert_eq!(state.plant("1").unwrap().status, PlantStatus::Healthy);
        assert!(state.alerts().is_empty());
    }

    #[test]
    fn test_alert_emitted_every_tick_while_unhealthy() {
        // Known product behavior: a plant stuck below threshold nags on
        // every tick, with no de-duplication or cool-down.
        let mut state = AppState::new();
        for _ in 0..5 {
            state.record_reading("1", reading(10));
        }

        assert_eq!(state.alerts().len(), 5);
    }

    #[test]
    fn test_alerts_capped_newest_first() {
        let mut state = AppState::new();
        for _ in 0..60 {
            state.record_reading("1", reading(10));
        }

        let alerts = state.alerts();
        assert_eq!(alerts.len(), MAX_ALERTS);
        // Newest first: timestamps never increase down the list
        for pair in alerts.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn test_dismiss_alert_keeps_relative_order() {
        let mut state = AppState::new();
        state.record_reading("1", reading(10));
        state.record_reading("2", reading(5));
        state.record_reading("3", reading(12));

        let alerts = state.alerts();
        assert_eq!(alerts.len(), 3);
        let dismissed = alerts[1].id.clone();
        let kept: Vec<String> = vec![alerts[0].id.clone(), alerts[2].id.clone()];

        state.dismiss_alert(&dismissed);

        let remaining: Vec<String> = state.alerts().iter().map(|a| a.id.clone()).collect();
        assert_eq!(remaining, kept);
    }

    #[test]
    fn test_dismiss_alert_is_idempotent() {
        let mut state = AppState::new();
        state.record_reading("1", reading(10));
        let id = state.alerts()[0].id.clone();

        state.dismiss_alert(&id);
        state.dismiss_alert(&id);

        assert!(state.alerts().is_empty());
    }

    #[test]
    fn test_add_plant_then_tick() {
        let mut state = AppState::new();
        let config = state.add_plant(input("Fern"));

        // Not ticked yet: placeholder entry with empty history
        let plant = state.plant(&config.id).unwrap();
        assert!(plant.history.is_empty());

        state.tick();

        let plant = state.plant(&config.id).unwrap();
        assert_eq!(plant.history.len(), 1);
    }

    #[test]
    fn test_added_plant_id_is_unique() {
        let mut state = AppState::new();
        let config = state.add_plant(input("Fern"));

        assert!(state.configs().iter().filter(|c| c.id == config.id).count() == 1);
        assert_ne!(config.id, "1");
    }

    #[test]
    fn test_update_plant_merges_fields() {
        let mut state = AppState::new();
        state.update_plant(
            "1",
            PlantUpdate {
                name: Some("Big Monstera".to_string()),
                critical_threshold: Some(25),
                ..Default::default()
            },
        );

        let config = &state.configs()[0];
        assert_eq!(config.name, "Big Monstera");
        assert_eq!(config.critical_threshold, 25);
        // Unspecified fields untouched
        assert_eq!(config.emoji, "🪴");
        assert_eq!(config.warning_threshold, 35);
    }

    #[test]
    fn test_update_unknown_plant_is_noop() {
        let mut state = AppState::new();
        let before: Vec<String> = state.configs().iter().map(|c| c.id.clone()).collect();

        state.update_plant(
            "no-such-plant",
            PlantUpdate {
                name: Some("X".to_string()),
                ..Default::default()
            },
        );

        let after: Vec<String> = state.configs().iter().map(|c| c.id.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(state.configs().len(), 3);
    }

    #[test]
    fn test_config_edit_visible_in_read_model_before_next_tick() {
        let mut state = AppState::new();
        state.tick();

        state.update_plant(
            "1",
            PlantUpdate {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(state.plant("1").unwrap().config.name, "Renamed");
    }

    #[test]
    fn test_remove_plant_drops_config_and_telemetry() {
        let mut state = AppState::new();
        state.tick();
        state.record_reading("2", reading(5));
        assert_eq!(state.alerts().len(), 1);

        state.remove_plant("2");

        assert!(state.plant("2").is_none());
        assert!(state.history("2").is_none());
        assert!(state.plants().iter().all(|p| p.config.id != "2"));
        // Past alerts referencing the plant are retained
        assert_eq!(state.alerts().len(), 1);
    }

    #[test]
    fn test_remove_unknown_plant_is_noop() {
        let mut state = AppState::new();
        state.remove_plant("no-such-plant");
        assert_eq!(state.configs().len(), 3);
    }

    #[test]
    fn test_snapshot_shape() {
        let mut state = AppState::new();
        state.tick();
        let snapshot = state.snapshot();

        assert_eq!(snapshot.plants.len(), 3);
        assert_eq!(snapshot.plant_configs.len(), 3);
        assert_eq!(snapshot.alerts.len(), state.alerts().len());
    }

    #[test]
    fn test_record_reading_unknown_plant_is_noop() {
        let mut state = AppState::new();
        state.record_reading("no-such-plant", reading(10));

        assert!(state.alerts().is_empty());
        assert!(state.plant("no-such-plant").is_none());
    }

    #[test]
    fn test_client_management() {
        let mut state = AppState::new();

        state.add_client("client-1".to_string());
        state.add_client("client-2".to_string());
        assert_eq!(state.client_count(), 2);

        state.remove_client("client-1");
        assert_eq!(state.client_count(), 1);
    }
}
