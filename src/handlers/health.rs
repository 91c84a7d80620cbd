use axum::extract::State;
use serde::Serialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// GET /health - liveness plus a store round trip
pub async fn get(State(state): State<AppState>) -> ApiResult<Health> {
    match state.planner.health_check().await {
        Ok(()) => Ok(ApiResponse::success(Health {
            status: "ok",
            timestamp: chrono::Utc::now(),
        })),
        Err(e) => {
            tracing::error!("Store health check failed: {}", e);
            Err(ApiError::service_unavailable("store unavailable"))
        }
    }
}
