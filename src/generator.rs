//! Simulated sensor source
//!
//! This module is the single source of sensor data in the system. Readings
//! are drawn uniformly from fixed per-metric ranges; there is no hardware
//! behind them. If real soil probes are ever wired in, this module is the
//! one to replace.
//!
//! The periodic tick is owned by a background task spawned through
//! [`SensorSimulator::spawn`]; the returned [`SimulatorHandle`] must be
//! shut down at teardown so no tick fires against a stopped application.

use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use crate::models::SensorReading;
use crate::state::AppState;

/// Generate one simulated reading.
///
/// Ranges: moisture 10-90 %, temperature 18.0-33.0 °C at one decimal,
/// humidity 40-80 %, light 200-1000 lux.
pub fn generate_reading() -> SensorReading {
    let mut rng = rand::thread_rng();

    SensorReading {
        moisture: rng.gen_range(10..=90),
        temperature: (rng.gen_range(18.0..=33.0_f64) * 10.0).round() / 10.0,
        humidity: rng.gen_range(40..=80),
        light: rng.gen_range(200..=1000),
        timestamp: Utc::now(),
    }
}

/// Drives the telemetry engine on a fixed period
pub struct SensorSimulator {
    /// Interval between ticks in milliseconds
    interval_ms: u64,
}

impl SensorSimulator {
    /// Create a new simulator
    pub fn new(interval_ms: u64) -> Self {
        info!(interval_ms = interval_ms, "Initializing sensor simulator");
        Self { interval_ms }
    }

    /// Spawn the tick loop onto the current runtime.
    ///
    /// The first tick fires immediately, then one every `interval_ms`
    /// until the returned handle is shut down.
    pub fn spawn(self, state: Arc<RwLock<AppState>>) -> SimulatorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = actix_rt::spawn(self.run(state, shutdown_rx));

        SimulatorHandle {
            shutdown: shutdown_tx,
            handle,
        }
    }

    async fn run(self, state: Arc<RwLock<AppState>>, mut shutdown: watch::Receiver<bool>) {
        info!("Starting telemetry tick loop");

        let mut tick_interval = interval(Duration::from_millis(self.interval_ms));

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    let mut state = state.write().await;
                    state.tick();
                    debug!(tick = state.tick_count(), "Simulator tick applied");
                }
                _ = shutdown.changed() => {
                    info!("Telemetry tick loop stopped");
                    return;
                }
            }
        }
    }
}

/// Owns the running tick task. Dropping the handle closes the shutdown
/// channel and the loop exits on its own, but [`SimulatorHandle::shutdown`]
/// additionally waits for the task, so teardown should go through it.
pub struct SimulatorHandle {
    shutdown: watch::Sender<bool>,
    handle: tokio::task::JoinHandle<()>,
}

impl SimulatorHandle {
    /// Cancel the periodic trigger and wait for the task to exit.
    ///
    /// Once this returns, no further tick will mutate the state.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
