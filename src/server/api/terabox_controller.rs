use axum::{
    Extension, Json, Router,
    extract::Query,
    response::Response,
    routing::{get, post},
};
use tracing::info;

use crate::platform::Platform;
use crate::server::dtos::media_dto::DownloadRequest;
use crate::server::dtos::proxy_dto::ThumbnailQuery;
use crate::server::dtos::terabox_dto::TeraboxResponse;
use crate::server::error::{AppResult, Error};
use crate::server::extractors::ValidationExtractor;
use crate::server::services::app_services::AppServices;
use crate::server::utils::validation_utils::{classify, sanitize_url};

use super::proxy_controller::ProxyController;

pub struct TeraboxController;

impl TeraboxController {
    pub fn app() -> Router {
        Router::new()
            .route("/", post(Self::download_post))
            .route("/thumbnail", get(Self::thumbnail_get))
    }

    async fn download_post(
        Extension(services): Extension<AppServices>,
        ValidationExtractor(request): ValidationExtractor<DownloadRequest>,
    ) -> AppResult<Json<TeraboxResponse>> {
        let url = sanitize_url(&request.url);
        if !classify(&url, Platform::Terabox).is_valid() {
            return Err(Error::InvalidUrl("Invalid Terabox URL".to_string()));
        }

        let listing = services.terabox.fetch_files(&url).await?;

        let files = listing
            .files
            .into_iter()
            .map(|mut file| {
                file.thumbnail =
                    ProxyController::proxied_thumbnail_url(Platform::Terabox, &file.thumbnail);
                file
            })
            .collect();

        info!("served terabox listing with {} files", listing.total);

        Ok(Json(TeraboxResponse {
            success: true,
            files,
            total: listing.total,
        }))
    }

    async fn thumbnail_get(Query(params): Query<ThumbnailQuery>) -> AppResult<Response> {
        let Some(url) = params.url.filter(|u| !u.is_empty()) else {
            return Err(Error::BadRequest("URL parameter is required".to_string()));
        };

        ProxyController::validate_thumbnail_url(Platform::Terabox, &url)?;
        ProxyController::fetch_thumbnail(Platform::Terabox, &url).await
    }
}
