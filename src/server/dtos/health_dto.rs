use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
    pub environment: String,
    pub services: ServiceHealthDetails,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealthDetails {
    pub rate_limiter: StoreHealth,
    pub response_cache: StoreHealth,
}

/// Health of one in-process store, reported by entry count so operators
/// can spot a sweeper that stopped running.
#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub status: HealthStatus,
    pub entries: usize,
}
