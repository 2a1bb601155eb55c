// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::trip_service::TripService;
use crate::infrastructure::config::{load_app_config, non_empty};
use crate::infrastructure::nominatim_geocoder::NominatimGeocoder;
use crate::infrastructure::openroute_provider::OpenRouteProvider;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{create_trip, health_check};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("eld_trip_planner=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;
    let api_key = non_empty(app_config.routing.api_key);
    if api_key.is_none() {
        tracing::warn!("No routing API key configured; trip requests will fail");
    }

    // Create adapters (infrastructure layer)
    let geocoder = Arc::new(NominatimGeocoder::new(
        app_config.geocoding.base_url,
        app_config.geocoding.user_agent,
    ));
    let router_provider = Arc::new(OpenRouteProvider::new(
        app_config.routing.base_url,
        app_config.routing.profile,
        api_key,
    ));

    // Create services (application layer)
    let trip_service = TripService::new(geocoder, router_provider, app_config.trip.default_start);
    let state = Arc::new(AppState { trip_service });

    // Build router (presentation layer)
    // Compression is handled in the response builder, not by a layer
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/api/trips/", post(create_trip))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", app_config.server.bind))?;
    tracing::info!("Starting eld-trip-planner service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
