use axum::{Extension, Json, Router, routing::post};
use tracing::{debug, info, warn};

use crate::platform::Platform;
use crate::server::dtos::media_dto::{DownloadRequest, MediaResponse};
use crate::server::error::{AppResult, Error};
use crate::server::extractors::{ClientIdentity, ValidationExtractor};
use crate::server::services::app_services::AppServices;
use crate::server::services::rate_limit_services::RateLimitResult;
use crate::server::utils::validation_utils::{classify, is_browser_user_agent, sanitize_url};

pub struct TikTokController;

impl TikTokController {
    pub fn app() -> Router {
        Router::new().route("/", post(Self::download_post))
    }

    /// the full download pipeline: payload shape, user agent gate, rate
    /// limit, url validation, extraction with fallback, sanitized response
    async fn download_post(
        identity: ClientIdentity,
        Extension(services): Extension<AppServices>,
        ValidationExtractor(request): ValidationExtractor<DownloadRequest>,
    ) -> AppResult<Json<MediaResponse>> {
        // only enforced in production so local curl testing stays easy
        if crate::server::is_production() && !is_browser_user_agent(identity.user_agent.as_deref())
        {
            warn!("blocked non-browser client {}", identity.ip);
            return Err(Error::Forbidden(
                "Invalid or missing User-Agent".to_string(),
            ));
        }

        match services.rate_limit.check_rate_limit(&identity.ip).await {
            RateLimitResult::Allowed { remaining, .. } => {
                debug!("client {} has {} requests left in window", identity.ip, remaining);
            }
            RateLimitResult::RateLimited { retry_after } => {
                warn!("rate limited {} for {}s", identity.ip, retry_after);
                return Err(Error::RateLimited { retry_after });
            }
        }

        let url = sanitize_url(&request.url);
        let validation = classify(&url, Platform::TikTok);
        if !validation.is_valid() {
            debug!(
                "rejected tiktok url from {}: {}",
                identity.ip,
                validation.reason().unwrap_or("unknown")
            );
            return Err(Error::InvalidUrl(
                "Invalid TikTok URL. Please provide a valid TikTok video link.".to_string(),
            ));
        }

        let media = services.tiktok.fetch_media(&url).await?;

        info!("served tiktok media for {}", identity.ip);

        Ok(Json(MediaResponse::new(media)))
    }
}
