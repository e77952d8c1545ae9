/// Liveness and health endpoints
///
/// # Endpoints
///
/// - `GET /`: plain-text banner, no dependencies
/// - `GET /health`: JSON status including database connectivity
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "connections": { "active": 1, "idle": 4 }
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskdesk_shared::db::pool::{get_pool_stats, health_check as db_health_check};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: String,

    pub version: String,

    /// `connected` or `disconnected`
    pub database: String,

    pub connections: ConnectionStats,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionStats {
    pub active: u32,
    pub idle: u32,
}

pub async fn banner() -> &'static str {
    "Task manager API is running..."
}

/// Health check handler
///
/// Always answers 200; a failed database ping is reported as `degraded`.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match db_health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let stats = get_pool_stats(&state.db);

    Ok(Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if connected { "connected" } else { "disconnected" }.to_string(),
        connections: ConnectionStats {
            active: stats.active_connections,
            idle: stats.idle_connections,
        },
    }))
}
