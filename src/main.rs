//! PlantWatch - Smart Plant Dashboard backend
//!
//! Simulates plant-health sensor readings for a configurable set of
//! plants, raises moisture-threshold alerts and serves the dashboard over
//! REST and WebSocket. All sensor data is generated in-process on a timer;
//! there is no hardware and nothing is persisted.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod error;
mod generator;
mod handlers;
mod models;
mod state;
mod validation;
mod websocket;

use crate::config::Settings;
use crate::generator::SensorSimulator;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env
    dotenv::dotenv().ok();

    // Logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,plantwatch=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();

    // Load configuration
    let settings = Settings::from_env().expect("Failed to load configuration");
    let bind_address = format!("{}:{}", settings.server.host, settings.server.port);

    info!("Starting PlantWatch backend");
    info!("Binding server to {}", bind_address);

    // Shared application state, default plant set
    let app_state = Arc::new(RwLock::new(AppState::new()));

    // ---------------------------------------------------------------------
    // Telemetry tick loop
    // The handle owns the periodic trigger; it is shut down exactly once
    // after the HTTP server exits so no tick runs against a stopped app.
    // ---------------------------------------------------------------------
    let simulator =
        SensorSimulator::new(settings.simulator.interval_ms).spawn(app_state.clone());

    // ---------------------------------------------------------------------
    // HTTP + WebSocket server
    // ---------------------------------------------------------------------
    let http_state = app_state.clone();
    let result = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(http_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await;

    simulator.shutdown().await;
    info!("PlantWatch backend stopped");

    result
}
