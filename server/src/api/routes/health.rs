//! Liveness and health check endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::HabitStore;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Store backend name
    pub store: &'static str,
}

#[derive(Clone)]
pub struct HealthState {
    pub store: HabitStore,
}

/// Build health routes
pub fn routes(store: HabitStore) -> Router<()> {
    Router::new()
        .route("/", get(health))
        .with_state(HealthState { store })
}

/// Plain-text liveness check
pub async fn root() -> &'static str {
    "App is running"
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Habit store unreachable", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<HealthState>) -> impl IntoResponse {
    let store = state.store.backend_name();
    let (status_code, status) = match state.store.repository().health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, store, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };
    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store,
        }),
    )
}
