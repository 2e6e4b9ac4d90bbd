use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

#[derive(Clone)]
pub struct RateLimitConfig {
    /// maximum requests per window for the download endpoints
    pub max_requests_per_window: u32,
    /// window duration in seconds
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            // every allowed request fans out to at least one upstream fetch,
            // so the budget stays tight
            max_requests_per_window: 20,
            window_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// request is allowed
    Allowed { remaining: u32, reset_at: i64 },
    /// client has spent its budget for the current window
    RateLimited { retry_after: u64 },
}

pub type DynRateLimitService = Arc<dyn RateLimitServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait RateLimitServiceTrait {
    /// check whether a request from this client is allowed, counting it if so
    async fn check_rate_limit(&self, client_id: &str) -> RateLimitResult;

    /// drop windows that have already reset, returning how many were removed
    async fn sweep_expired(&self) -> usize;

    /// number of clients currently holding a window
    async fn tracked_clients(&self) -> usize;
}

struct ClientWindow {
    count: u32,
    window_started_at: i64,
}

/// fixed-window limiter keyed by client ip, held in process memory.
/// a restart forgets every window, which is fine for this workload.
pub struct MemoryRateLimitService {
    windows: Mutex<HashMap<String, ClientWindow>>,
    config: RateLimitConfig,
}

impl MemoryRateLimitService {
    pub fn new() -> Self {
        Self::with_config(RateLimitConfig::default())
    }

    pub fn with_config(config: RateLimitConfig) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            config,
        }
    }
}

impl Default for MemoryRateLimitService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimitServiceTrait for MemoryRateLimitService {
    async fn check_rate_limit(&self, client_id: &str) -> RateLimitResult {
        let now = chrono::Utc::now().timestamp();
        let window = self.config.window_seconds as i64;
        let mut windows = self.windows.lock().unwrap();

        let entry = windows
            .entry(client_id.to_string())
            .or_insert(ClientWindow {
                count: 0,
                window_started_at: now,
            });

        if now - entry.window_started_at >= window {
            entry.count = 0;
            entry.window_started_at = now;
        }

        let reset_at = entry.window_started_at + window;

        if entry.count >= self.config.max_requests_per_window {
            debug!(
                "client {} rate limited: {} requests in window",
                client_id, entry.count
            );
            return RateLimitResult::RateLimited {
                retry_after: (reset_at - now).max(1) as u64,
            };
        }

        entry.count += 1;
        RateLimitResult::Allowed {
            remaining: self.config.max_requests_per_window - entry.count,
            reset_at,
        }
    }

    async fn sweep_expired(&self) -> usize {
        let now = chrono::Utc::now().timestamp();
        let window = self.config.window_seconds as i64;
        let mut windows = self.windows.lock().unwrap();

        let before = windows.len();
        windows.retain(|_, entry| now - entry.window_started_at < window);
        let removed = before - windows.len();

        if removed > 0 {
            debug!("rate limit sweep removed {} expired windows", removed);
        }
        removed
    }

    async fn tracked_clients(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}
