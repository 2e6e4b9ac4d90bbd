use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::Query,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{debug, error, warn};
use url::Url;

use crate::platform::{self, BROWSER_USER_AGENT, DEFAULT_REFERER, Platform};
use crate::server::dtos::proxy_dto::ProxyQuery;
use crate::server::error::{AppResult, Error};
use crate::server::utils::sanitize_utils::{infer_content_type, sanitize_filename};
use crate::server::utils::validation_utils::is_private_host;

const DOWNLOAD_ACCEPT: &str = "audio/mpeg, video/mp4, */*";
const THUMBNAIL_ACCEPT: &str = "image/webp,image/apng,image/svg+xml,image/*,*/*;q=0.8";
const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// how long the dial to a media host may take before the fetch is abandoned
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ProxyController;

impl ProxyController {
    pub fn app() -> Router {
        Router::new().route("/", get(Self::download_get))
    }

    async fn download_get(Query(params): Query<ProxyQuery>) -> AppResult<Response> {
        let Some(raw_url) = params.url.filter(|u| !u.is_empty()) else {
            return Err(Error::BadRequest("URL parameter is required".to_string()));
        };

        Self::validate_media_url(&raw_url)?;

        let filename = sanitize_filename(params.filename.as_deref().unwrap_or("download"));

        Self::fetch_and_stream(&raw_url, &filename).await
    }

    /// streaming client for the media and thumbnail fetches: bounded dial,
    /// no total deadline on the body
    fn media_client() -> reqwest::Client {
        reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }

    /// rewrite an upstream thumbnail url onto our own thumbnail proxy route
    /// so the frontend never loads cdn images directly
    pub fn proxied_thumbnail_url(platform: Platform, raw_url: &str) -> String {
        if raw_url.is_empty() {
            return String::new();
        }
        format!(
            "/api/{}/thumbnail?url={}",
            platform.as_str(),
            urlencoding::encode(raw_url)
        )
    }

    /// scheme, ssrf and allowlist checks for proxied media urls
    pub fn validate_media_url(raw_url: &str) -> AppResult<()> {
        let parsed =
            Url::parse(raw_url).map_err(|_| Error::InvalidUrl("Invalid URL format".to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl("Invalid URL format".to_string()));
        }

        let host = parsed.host_str().unwrap_or("");
        if is_private_host(host) || !platform::media_host_allowed(host) {
            warn!("refusing to proxy media from {}", host);
            return Err(Error::InvalidUrl("Invalid URL format".to_string()));
        }

        Ok(())
    }

    /// scheme, ssrf and allowlist checks for the per-platform thumbnail routes
    pub fn validate_thumbnail_url(platform: Platform, raw_url: &str) -> AppResult<()> {
        let parsed =
            Url::parse(raw_url).map_err(|_| Error::InvalidUrl("Invalid URL format".to_string()))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl("Invalid URL format".to_string()));
        }

        let host = parsed.host_str().unwrap_or("");
        if is_private_host(host) || !platform::thumbnail_host_allowed(platform, host) {
            warn!(
                "refusing to proxy {} thumbnail from {}",
                platform.as_str(),
                host
            );
            return Err(Error::InvalidUrl("Invalid URL format".to_string()));
        }

        Ok(())
    }

    /// fetch the media file and restream it as an attachment. callers are
    /// expected to have validated the target url already.
    pub async fn fetch_and_stream(target_url: &str, filename: &str) -> AppResult<Response> {
        let host = Url::parse(target_url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(|h| h.to_string()))
            .unwrap_or_default();

        // dedicated client without a total timeout, large downloads can
        // outlive the shared client's deadline. the dial itself still has to
        // finish inside CONNECT_TIMEOUT so a dead cdn cannot hold the request
        let client = Self::media_client();

        let mut request_builder = client
            .get(target_url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::ACCEPT, DOWNLOAD_ACCEPT)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header("Sec-Fetch-Dest", "audio")
            .header("Sec-Fetch-Mode", "no-cors")
            .header("Sec-Fetch-Site", "cross-site");

        // cdns refuse downloads that arrive without the referer they expect
        request_builder = match platform::profile_for_host(&host) {
            Some(profile) => {
                let mut builder = request_builder.header(header::REFERER, profile.referer);
                if let Some(origin) = profile.origin {
                    builder = builder.header(header::ORIGIN, origin);
                }
                builder
            }
            None => request_builder.header(header::REFERER, DEFAULT_REFERER),
        };

        debug!("proxying download from {}", host);

        let response = request_builder.send().await.map_err(|e| {
            error!("download fetch failed for {}: {}", host, e);
            Error::UpstreamUnavailable {
                surface_status: None,
                message: format!("download fetch failed: {}", e),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("download source answered {} for {}", status, host);
            return Err(Error::UpstreamUnavailable {
                surface_status: Some(status),
                message: format!("Failed to fetch: {}", status.as_u16()),
            });
        }

        let upstream_content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // an html body here is the cdn serving its link-expired page
        if upstream_content_type.contains("text/html") {
            warn!("download source served html for {}", host);
            return Err(Error::InvalidSource(
                "Download link expired or invalid. Please try again.".to_string(),
            ));
        }

        let content_type = infer_content_type(filename, &upstream_content_type);
        let content_length = response.content_length();

        let mut response_headers = HeaderMap::new();
        response_headers.insert(
            header::CONTENT_TYPE,
            content_type.parse().unwrap_or_else(|_| {
                "application/octet-stream"
                    .parse()
                    .expect("Static header value should parse")
            }),
        );
        response_headers.insert(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename)
                .parse()
                .expect("Sanitized filename should parse"),
        );
        response_headers.insert(
            header::CACHE_CONTROL,
            "no-cache".parse().expect("Static header value should parse"),
        );
        if let Some(length) = content_length {
            response_headers.insert(header::CONTENT_LENGTH, length.into());
        }

        let body = Body::from_stream(response.bytes_stream());

        Ok((StatusCode::OK, response_headers, body).into_response())
    }

    /// fetch a thumbnail with the headers its cdn expects and restream it.
    /// shared by the per-platform thumbnail routes.
    pub async fn fetch_thumbnail(platform: Platform, target_url: &str) -> AppResult<Response> {
        let client = Self::media_client();

        let mut request_builder = client
            .get(target_url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::ACCEPT, THUMBNAIL_ACCEPT)
            .header(header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
            .header("Sec-Fetch-Dest", "image")
            .header("Sec-Fetch-Mode", "no-cors")
            .header("Sec-Fetch-Site", "cross-site");

        request_builder = match platform {
            Platform::YouTube => {
                request_builder.header(header::REFERER, "https://www.youtube.com/")
            }
            Platform::Instagram => request_builder
                .header(header::REFERER, "https://www.instagram.com/")
                .header(header::ORIGIN, "https://www.instagram.com"),
            Platform::Terabox => request_builder
                .header(header::REFERER, "https://www.terabox.com/")
                .header(header::ORIGIN, "https://www.terabox.com"),
            Platform::TikTok => {
                request_builder.header(header::REFERER, "https://www.tiktok.com/")
            }
            Platform::Facebook => {
                request_builder.header(header::REFERER, "https://www.facebook.com/")
            }
        };

        debug!("proxying {} thumbnail", platform.as_str());

        let response = request_builder.send().await.map_err(|e| {
            error!("{} thumbnail fetch failed: {}", platform.as_str(), e);
            Error::UpstreamUnavailable {
                surface_status: None,
                message: "Failed to load thumbnail".to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} thumbnail source answered {}", platform.as_str(), status);
            return Err(Error::UpstreamUnavailable {
                surface_status: Some(status),
                message: "Failed to fetch thumbnail".to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();

        let content_length = response.content_length();

        let mut response_headers = HeaderMap::new();
        response_headers.insert(
            header::CONTENT_TYPE,
            content_type.parse().unwrap_or_else(|_| {
                "image/jpeg".parse().expect("Static header value should parse")
            }),
        );
        response_headers.insert(
            header::CACHE_CONTROL,
            "public, max-age=86400"
                .parse()
                .expect("Static header value should parse"),
        );
        response_headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            "*".parse().expect("Static header value should parse"),
        );
        if let Some(length) = content_length {
            response_headers.insert(header::CONTENT_LENGTH, length.into());
        }

        let body = Body::from_stream(response.bytes_stream());

        Ok((StatusCode::OK, response_headers, body).into_response())
    }
}
