//! HTTP request handlers
//!
//! REST endpoints for the plant dashboard. Mutations mirror the engine's
//! semantics: they always succeed, and unknown ids are silent no-ops, so
//! the UI never has to special-case a plant or alert that just vanished.

use actix_web::{web, HttpRequest, HttpResponse, Result};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{HealthCheck, PlantInput, PlantUpdate};
use crate::state::AppState;
use crate::validation::{validate_alert_limit, validate_plant_input, validate_plant_update};
use crate::websocket::WsSession;

/// Configure all application routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Health check
            .route("/health", web::get().to(health_check))
            // Plant configuration and telemetry
            .route("/plants", web::get().to(list_plants))
            .route("/plants", web::post().to(add_plant))
            .route("/plants/{id}", web::get().to(get_plant))
            .route("/plants/{id}", web::patch().to(update_plant))
            .route("/plants/{id}", web::delete().to(remove_plant))
            .route("/plants/{id}/history", web::get().to(get_plant_history))
            // Alert feed
            .route("/alerts", web::get().to(list_alerts))
            .route("/alerts/{id}", web::delete().to(dismiss_alert))
            // Full dashboard view
            .route("/snapshot", web::get().to(get_snapshot)),
    )
    // WebSocket endpoint
    .route("/ws", web::get().to(websocket_handler));
}

/// Health check endpoint
///
/// GET /api/health
pub async fn health_check(
    state: web::Data<Arc<RwLock<AppState>>>,
) -> Result<HttpResponse, AppError> {
    let state = state.read().await;

    let health = HealthCheck {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        uptime_seconds: state.uptime_seconds(),
        tick_count: state.tick_count(),
        connected_clients: state.client_count(),
        last_tick: state.last_tick(),
    };

    Ok(HttpResponse::Ok().json(health))
}

/// List the per-plant read model, one entry per configured plant
///
/// GET /api/plants
pub async fn list_plants(
    state: web::Data<Arc<RwLock<AppState>>>,
) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    Ok(HttpResponse::Ok().json(state.plants()))
}

/// Get a single plant's telemetry view
///
/// GET /api/plants/{id}
pub async fn get_plant(
    state: web::Data<Arc<RwLock<AppState>>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();
    let state = state.read().await;

    match state.plant(&plant_id) {
        Some(plant) => Ok(HttpResponse::Ok().json(plant)),
        None => Err(AppError::NotFound(format!("No plant with id {}", plant_id))),
    }
}

/// Get a single plant's bounded reading history, oldest first
///
/// GET /api/plants/{id}/history
pub async fn get_plant_history(
    state: web::Data<Arc<RwLock<AppState>>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();
    let state = state.read().await;

    match state.history(&plant_id) {
        Some(history) => Ok(HttpResponse::Ok().json(history)),
        None => Err(AppError::NotFound(format!("No plant with id {}", plant_id))),
    }
}

/// Register a new plant
///
/// POST /api/plants
pub async fn add_plant(
    state: web::Data<Arc<RwLock<AppState>>>,
    body: web::Json<PlantInput>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let correlation_id = extract_correlation_id(&req);

    validate_plant_input(&body)?;

    let config = {
        let mut state = state.write().await;
        state.add_plant(body.into_inner())
    };

    info!(
        correlation_id = %correlation_id,
        plant_id = %config.id,
        "Plant created"
    );

    Ok(HttpResponse::Created().json(config))
}

/// Partially update a plant's configuration. Unknown ids are a no-op.
///
/// PATCH /api/plants/{id}
pub async fn update_plant(
    state: web::Data<Arc<RwLock<AppState>>>,
    path: web::Path<String>,
    body: web::Json<PlantUpdate>,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();

    validate_plant_update(&body)?;

    let mut state = state.write().await;
    state.update_plant(&plant_id, body.into_inner());

    Ok(HttpResponse::NoContent().finish())
}

/// Remove a plant and its telemetry. Unknown ids are a no-op.
///
/// DELETE /api/plants/{id}
pub async fn remove_plant(
    state: web::Data<Arc<RwLock<AppState>>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let plant_id = path.into_inner();

    let mut state = state.write().await;
    state.remove_plant(&plant_id);

    Ok(HttpResponse::NoContent().finish())
}

/// Query parameters for the alert feed
#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<usize>,
}

/// List current alerts, newest first
///
/// GET /api/alerts?limit=50
pub async fn list_alerts(
    state: web::Data<Arc<RwLock<AppState>>>,
    query: web::Query<AlertsQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = validate_alert_limit(query.limit)?;

    let state = state.read().await;
    let mut alerts = state.alerts();
    alerts.truncate(limit);

    Ok(HttpResponse::Ok().json(alerts))
}

/// Dismiss an alert by id. Idempotent; unknown ids are a no-op.
///
/// DELETE /api/alerts/{id}
pub async fn dismiss_alert(
    state: web::Data<Arc<RwLock<AppState>>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let alert_id = path.into_inner();

    let mut state = state.write().await;
    state.dismiss_alert(&alert_id);

    Ok(HttpResponse::NoContent().finish())
}

/// Full dashboard state in one response
///
/// GET /api/snapshot
pub async fn get_snapshot(
    state: web::Data<Arc<RwLock<AppState>>>,
) -> Result<HttpResponse, AppError> {
    let state = state.read().await;
    Ok(HttpResponse::Ok().json(state.snapshot()))
}

/// WebSocket upgrade handler
///
/// GET /ws
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<Arc<RwLock<AppState>>>,
) -> Result<HttpResponse, actix_web::Error> {
    let client_id = Uuid::new_v4().to_string();

    info!(client_id = %client_id, "WebSocket connection request");

    {
        let mut state = state.write().await;
        state.add_client(client_id.clone());
    }

    let ws_session = WsSession::new(client_id, state.get_ref().clone());

    actix_web_actors::ws::start(ws_session, &req, stream)
}

/// Extract or generate correlation ID from request headers
fn extract_correlation_id(req: &HttpRequest) -> String {
    req.headers()
        .get("X-Correlation-ID")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
