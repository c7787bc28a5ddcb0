//! Liveness and readiness probe.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::warn;

use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let database = match state.stores.health_check().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };
    let storage = match state.storage.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            warn!(error = %e, "Storage health check failed");
            false
        }
    };

    let healthy = database && storage;
    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (
        status,
        Json(json!({
            "success": healthy,
            "data": {
                "status": if healthy { "ok" } else { "degraded" },
                "version": env!("CARGO_PKG_VERSION"),
                "database": database,
                "storage": storage,
            }
        })),
    )
}
