//! Motor de detección de conflictos y auto-asignación de viajes
//!
//! Decide si una combinación conductor/vehículo/cliente se puede programar
//! para un viaje, propone asignaciones automáticas para un día y calcula la
//! utilización de los conductores. Se expone como router de Axum.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Router principal de la aplicación
pub fn create_app(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest(
            "/api/tenants/:tenant_id",
            routes::rostering_routes::create_rostering_router(),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Endpoint de salud simple
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "service": "transport-rostering",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
