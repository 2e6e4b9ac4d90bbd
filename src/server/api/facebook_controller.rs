use axum::{Extension, Json, Router, routing::post};
use tracing::info;

use crate::platform::Platform;
use crate::server::dtos::facebook_dto::FacebookResponse;
use crate::server::dtos::media_dto::DownloadRequest;
use crate::server::error::{AppResult, Error};
use crate::server::extractors::ValidationExtractor;
use crate::server::services::app_services::AppServices;
use crate::server::utils::validation_utils::{classify, sanitize_url};

pub struct FacebookController;

impl FacebookController {
    pub fn app() -> Router {
        Router::new().route("/", post(Self::download_post))
    }

    async fn download_post(
        Extension(services): Extension<AppServices>,
        ValidationExtractor(request): ValidationExtractor<DownloadRequest>,
    ) -> AppResult<Json<FacebookResponse>> {
        let url = sanitize_url(&request.url);
        if !classify(&url, Platform::Facebook).is_valid() {
            return Err(Error::InvalidUrl("Invalid Facebook URL".to_string()));
        }

        let video = services.facebook.fetch_video(&url).await?;

        info!("served facebook video qualities");

        Ok(Json(FacebookResponse {
            success: true,
            data: video,
        }))
    }
}
