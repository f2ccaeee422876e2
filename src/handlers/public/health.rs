use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - service banner
pub async fn root() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Trading journal API"
    }))
}

/// GET /health - 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    let ctx = state.ctx();
    match ctx.run(state.stores.health.ping()).await {
        Ok(Ok(())) => Ok(ApiResponse::success(json!({ "status": "ok" }))),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "health check failed");
            Err(ApiError::service_unavailable("store unavailable"))
        }
        Err(e) => {
            tracing::error!(error = %e, "health check abandoned");
            Err(ApiError::service_unavailable("store unavailable"))
        }
    }
}
