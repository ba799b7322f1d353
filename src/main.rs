// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use crate::application::dashboard_service::DashboardService;
use crate::application::fleet_service::FleetService;
use crate::application::reading_service::ReadingService;
use crate::application::weather_service::WeatherService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::memory_store::InMemoryStore;
use crate::infrastructure::observability::init_tracing;
use crate::infrastructure::openweather::OpenWeatherClient;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_config = load_app_config()?;

    // Store (infrastructure layer)
    let store = Arc::new(match &app_config.store.seed_file {
        Some(path) => InMemoryStore::load_seed_file(path).await?,
        None => InMemoryStore::new(),
    });

    let weather_client = OpenWeatherClient::new(
        app_config.weather.base_url.clone(),
        app_config.weather.api_key.clone(),
        Duration::from_millis(app_config.weather.timeout_ms),
    )?;
    if app_config.weather.api_key.is_none() {
        tracing::warn!("No weather API key configured; /weather will report an upstream error");
    }

    // Services (application layer)
    let state = Arc::new(AppState {
        reading_service: ReadingService::new(store.clone(), store.clone()),
        dashboard_service: DashboardService::new(
            store.clone(),
            store.clone(),
            app_config.dashboard.page_size,
        ),
        fleet_service: FleetService::new(store.clone(), store, app_config.fleet.fanout()),
        weather_service: WeatherService::new(Arc::new(weather_client)),
        default_range: app_config.dashboard.default_range.clone(),
    });

    // Router (presentation layer)
    let router = build_router(state);

    let addr: SocketAddr = app_config.server.bind_addr.parse()?;
    tracing::info!("Starting grid-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
