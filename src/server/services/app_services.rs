use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::AppConfig;
use crate::platform::BROWSER_USER_AGENT;

use super::facebook_services::{DynFacebookService, FacebookService};
use super::instagram_services::{DynInstagramService, InstagramService};
use super::rate_limit_services::{DynRateLimitService, MemoryRateLimitService};
use super::response_cache_services::{DynResponseCacheService, MemoryResponseCacheService};
use super::terabox_services::{DynTeraboxService, TeraboxService};
use super::tiktok_services::{DynTikTokService, TikTokService};
use super::youtube_services::{DynYouTubeService, YouTubeService};

/// everything the request handlers need, cloned into each request through an
/// axum Extension
#[derive(Clone)]
pub struct AppServices {
    pub rate_limit: DynRateLimitService,
    pub response_cache: DynResponseCacheService,
    pub tiktok: DynTikTokService,
    pub youtube: DynYouTubeService,
    pub instagram: DynInstagramService,
    pub facebook: DynFacebookService,
    pub terabox: DynTeraboxService,
    pub http: reqwest::Client,
    pub config: Arc<AppConfig>,
}

impl AppServices {
    pub fn new(config: Arc<AppConfig>) -> Self {
        info!("starting services...");

        // one client for everything outbound, per-host fetch headers get
        // applied per request
        let http = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(30))
            .http2_adaptive_window(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let rate_limit = Arc::new(MemoryRateLimitService::new()) as DynRateLimitService;
        let response_cache =
            Arc::new(MemoryResponseCacheService::new()) as DynResponseCacheService;

        let tiktok = Arc::new(TikTokService::new(http.clone(), response_cache.clone()))
            as DynTikTokService;
        let youtube = Arc::new(YouTubeService::new(http.clone())) as DynYouTubeService;
        let instagram = Arc::new(InstagramService::new(http.clone())) as DynInstagramService;
        let facebook = Arc::new(FacebookService::new(http.clone())) as DynFacebookService;
        let terabox = Arc::new(TeraboxService::new(http.clone())) as DynTeraboxService;

        info!("services ready");

        Self {
            rate_limit,
            response_cache,
            tiktok,
            youtube,
            instagram,
            facebook,
            terabox,
            http,
            config,
        }
    }
}
