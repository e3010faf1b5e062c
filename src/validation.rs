//! Input validation module
//!
//! Validation lives at the API boundary: the telemetry engine itself
//! accepts any input and never fails, so everything user-facing is checked
//! here before it reaches the engine.

use crate::error::{AppError, AppResult};
use crate::models::{PlantInput, PlantUpdate};
use tracing::{debug, warn};
use validator::Validate;

/// Most alerts a single query may request; matches the engine's feed cap
pub const MAX_ALERT_LIMIT: usize = crate::state::MAX_ALERTS;

/// Flatten `validator` field errors into one client-safe message
fn collect_field_errors<T: Validate>(value: &T) -> Result<(), String> {
    match value.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let messages: Vec<String> = errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let msgs: Vec<&str> = errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|c| c.as_ref()))
                        .collect();
                    format!("{}: {}", field, msgs.join(", "))
                })
                .collect();
            Err(messages.join("; "))
        }
    }
}

/// Validate a new-plant payload.
///
/// Threshold ordering (critical <= warning) is not enforced; the status
/// derivation tolerates an inverted pair.
pub fn validate_plant_input(input: &PlantInput) -> AppResult<()> {
    if let Err(message) = collect_field_errors(input) {
        warn!(errors = %message, "Plant input validation failed");
        return Err(AppError::ValidationError(message));
    }

    validate_name(&input.name)?;

    debug!("Plant input validation passed");
    Ok(())
}

/// Validate a partial-update payload; only provided fields are checked
pub fn validate_plant_update(updates: &PlantUpdate) -> AppResult<()> {
    if let Err(message) = collect_field_errors(updates) {
        warn!(errors = %message, "Plant update validation failed");
        return Err(AppError::ValidationError(message));
    }

    if let Some(name) = &updates.name {
        validate_name(name)?;
    }

    Ok(())
}

/// Names must contain something visible; the length derive alone lets
/// all-whitespace strings through
fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Plant name must not be blank".to_string(),
        ));
    }
    Ok(())
}

/// Validate an alert-feed limit query parameter
pub fn validate_alert_limit(limit: Option<usize>) -> AppResult<usize> {
    let limit = limit.unwrap_or(MAX_ALERT_LIMIT);

    if limit == 0 || limit > MAX_ALERT_LIMIT {
        return Err(AppError::ValidationError(format!(
            "Limit must be between 1 and {}",
            MAX_ALERT_LIMIT
        )));
    }

    Ok(limit)
}
