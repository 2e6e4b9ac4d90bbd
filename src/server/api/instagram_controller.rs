use axum::{
    Extension, Json, Router,
    extract::Query,
    response::Response,
    routing::{get, post},
};
use tracing::info;

use crate::platform::Platform;
use crate::server::dtos::instagram_dto::InstagramResponse;
use crate::server::dtos::media_dto::DownloadRequest;
use crate::server::dtos::proxy_dto::ThumbnailQuery;
use crate::server::error::{AppResult, Error};
use crate::server::extractors::ValidationExtractor;
use crate::server::services::app_services::AppServices;
use crate::server::utils::validation_utils::{classify, sanitize_url};

use super::proxy_controller::ProxyController;

pub struct InstagramController;

impl InstagramController {
    pub fn app() -> Router {
        Router::new()
            .route("/", post(Self::download_post))
            .route("/thumbnail", get(Self::thumbnail_get))
    }

    async fn download_post(
        Extension(services): Extension<AppServices>,
        ValidationExtractor(request): ValidationExtractor<DownloadRequest>,
    ) -> AppResult<Json<InstagramResponse>> {
        let url = sanitize_url(&request.url);
        if !classify(&url, Platform::Instagram).is_valid() {
            return Err(Error::InvalidUrl("Invalid Instagram URL".to_string()));
        }

        let post = services.instagram.fetch_post(&url).await?;

        let items = post
            .items
            .into_iter()
            .map(|mut item| {
                item.thumbnail =
                    ProxyController::proxied_thumbnail_url(Platform::Instagram, &item.thumbnail);
                item
            })
            .collect();

        info!("served instagram post");

        Ok(Json(InstagramResponse {
            success: true,
            data: items,
            thumbnail: ProxyController::proxied_thumbnail_url(Platform::Instagram, &post.thumbnail),
            title: post.title,
        }))
    }

    async fn thumbnail_get(Query(params): Query<ThumbnailQuery>) -> AppResult<Response> {
        let Some(url) = params.url.filter(|u| !u.is_empty()) else {
            return Err(Error::BadRequest("URL parameter is required".to_string()));
        };

        ProxyController::validate_thumbnail_url(Platform::Instagram, &url)?;
        ProxyController::fetch_thumbnail(Platform::Instagram, &url).await
    }
}
