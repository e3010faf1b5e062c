//! Configuration management module
//!
//! Loads and validates environment-based configuration.

use serde::Deserialize;
use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid number format in environment variable")]
    ParseError,
}

/// Server configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Simulator configuration settings
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorSettings {
    /// Interval in milliseconds between telemetry ticks
    pub interval_ms: u64,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub simulator: SimulatorSettings,
}

impl Settings {
    /// Load settings from environment variables
    pub fn from_env() -> Result<Self, SettingsError> {
        let port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".into())
            .parse()
            .map_err(|_| SettingsError::ParseError)?;

        let interval_ms = env::var("TICK_INTERVAL_MS")
            .unwrap_or_else(|_| "4000".into())
            .parse()
            .map_err(|_| SettingsError::ParseError)?;

        Ok(Self {
            server: ServerSettings {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
                port,
            },
            simulator: SimulatorSettings { interval_ms },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test touches the process environment so the cases cannot race
    #[test]
    fn test_settings_from_env() {
        env::remove_var("SERVER_HOST");
        env::remove_var("SERVER_PORT");
        env::remove_var("TICK_INTERVAL_MS");

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.simulator.interval_ms, 4000);

        env::set_var("SERVER_PORT", "3000");
        env::set_var("TICK_INTERVAL_MS", "500");

        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.simulator.interval_ms, 500);

        env::set_var("SERVER_PORT", "not-a-number");
        assert!(Settings::from_env().is_err());

        env::remove_var("SERVER_PORT");
        env::remove_var("TICK_INTERVAL_MS");
    }
}
