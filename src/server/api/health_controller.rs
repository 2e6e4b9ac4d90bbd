use axum::Extension;
use axum::Json;
use axum::http::StatusCode;
use chrono::Utc;

use crate::server::dtos::health_dto::{
    HealthResponse, HealthStatus, ServiceHealthDetails, StoreHealth,
};
use crate::server::services::app_services::AppServices;
use crate::server::{get_app_version, get_uptime_seconds};

/// health endpoint - reports the in-memory stores
/// if this isn't wanted comment out the health endpoint in ../mod.rs
pub async fn health_endpoint(
    Extension(services): Extension<AppServices>,
) -> (StatusCode, Json<HealthResponse>) {
    let rate_limiter = StoreHealth {
        status: HealthStatus::Healthy,
        entries: services.rate_limit.tracked_clients().await,
    };

    let response_cache = StoreHealth {
        status: HealthStatus::Healthy,
        entries: services.response_cache.entry_count().await,
    };

    // both stores are plain in-process maps, if the server answers at all
    // they are reachable
    let overall_status = HealthStatus::Healthy;

    let response = HealthResponse {
        status: overall_status,
        timestamp: Utc::now(),
        uptime_seconds: get_uptime_seconds(),
        version: get_app_version().to_string(),
        environment: format!("{:?}", services.config.cargo_env).to_lowercase(),
        services: ServiceHealthDetails {
            rate_limiter,
            response_cache,
        },
    };

    let http_status = match overall_status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (http_status, Json(response))
}
