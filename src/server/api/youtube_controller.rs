use axum::{
    Extension, Json, Router,
    extract::Query,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{debug, info};

use crate::platform::Platform;
use crate::server::dtos::media_dto::DownloadRequest;
use crate::server::dtos::proxy_dto::ThumbnailQuery;
use crate::server::dtos::youtube_dto::{ResolvedDownloadResponse, VideoInfoResponse};
use crate::server::error::{AppResult, Error};
use crate::server::extractors::ValidationExtractor;
use crate::server::services::app_services::AppServices;
use crate::server::utils::validation_utils::{classify, sanitize_url};

use super::proxy_controller::ProxyController;

pub struct YouTubeController;

impl YouTubeController {
    pub fn app() -> Router {
        Router::new()
            .route("/", post(Self::download_post))
            .route("/thumbnail", get(Self::thumbnail_get))
    }

    /// one route, two actions: `info` lists formats, `download` resolves a
    /// chosen format into a direct link
    async fn download_post(
        Extension(services): Extension<AppServices>,
        ValidationExtractor(request): ValidationExtractor<DownloadRequest>,
    ) -> AppResult<Response> {
        let url = sanitize_url(&request.url);
        if !classify(&url, Platform::YouTube).is_valid() {
            return Err(Error::InvalidUrl("Invalid YouTube URL".to_string()));
        }

        let action = request.action.as_deref().unwrap_or("info");
        match action {
            "info" => {
                let mut video_info = services.youtube.video_info(&url).await?;
                video_info.thumbnail =
                    ProxyController::proxied_thumbnail_url(Platform::YouTube, &video_info.thumbnail);

                info!("served youtube info");

                Ok(Json(VideoInfoResponse {
                    success: true,
                    data: video_info,
                })
                .into_response())
            }
            "download" => {
                let Some(format_id) = request.format_id.as_deref().filter(|f| !f.is_empty())
                else {
                    return Err(Error::BadRequest("format_id is required".to_string()));
                };
                let media_type = request.media_type.as_deref().unwrap_or("video");

                let resolved = services
                    .youtube
                    .resolve_download(&url, format_id, media_type)
                    .await?;

                info!("served youtube download link for format {}", format_id);

                Ok(Json(ResolvedDownloadResponse {
                    success: true,
                    data: resolved,
                })
                .into_response())
            }
            other => {
                debug!("unknown youtube action {:?}", other);
                Err(Error::BadRequest("Invalid action".to_string()))
            }
        }
    }

    async fn thumbnail_get(Query(params): Query<ThumbnailQuery>) -> AppResult<Response> {
        let Some(url) = params.url.filter(|u| !u.is_empty()) else {
            return Err(Error::BadRequest("URL parameter is required".to_string()));
        };

        ProxyController::validate_thumbnail_url(Platform::YouTube, &url)?;
        ProxyController::fetch_thumbnail(Platform::YouTube, &url).await
    }
}
