use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use tracing::{error, info};

use crate::server::dtos::youtube_dto::{FormatEntry, ResolvedDownload, VideoInfo};
use crate::server::error::{AppResult, Error};
use crate::server::services::GIMITA_API_BASE;

pub type DynYouTubeService = Arc<dyn YouTubeServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait YouTubeServiceTrait {
    /// list a video's metadata and downloadable formats
    async fn video_info(&self, url: &str) -> AppResult<VideoInfo>;

    /// resolve one format into a time-limited direct download link
    async fn resolve_download(
        &self,
        url: &str,
        format_id: &str,
        media_type: &str,
    ) -> AppResult<ResolvedDownload>;
}

pub struct YouTubeService {
    http: reqwest::Client,
    api_base: String,
}

impl YouTubeService {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_api_base(http, GIMITA_API_BASE)
    }

    /// base override so tests can point the service at a local stub
    pub fn with_api_base(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YtinfoEnvelope {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    uploader: String,
    #[serde(default)]
    thumbnail: String,
    duration: Option<f64>,
    #[serde(default)]
    audio_formats: Vec<FormatEntry>,
    #[serde(default)]
    video_formats: Vec<FormatEntry>,
}

#[derive(Debug, Deserialize)]
struct YtdownEnvelope {
    #[serde(default)]
    success: bool,
    message: Option<String>,
    download_url: Option<String>,
    filename: Option<String>,
    filesize: Option<f64>,
    title: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
    expires_in: Option<f64>,
}

#[async_trait]
impl YouTubeServiceTrait for YouTubeService {
    async fn video_info(&self, url: &str) -> AppResult<VideoInfo> {
        info!("fetching youtube info for {}", url);

        let response = self
            .http
            .get(format!("{}/api/downloader/ytinfo", self.api_base))
            .query(&[("url", url)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("ytinfo request failed: {}", e);
                Error::ExtractionFailed(format!("ytinfo request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            error!("ytinfo responded with status {}", status);
            return Err(Error::ExtractionFailed(format!(
                "API responded with status: {}",
                status
            )));
        }

        let envelope: YtinfoEnvelope = response.json().await.map_err(|e| {
            error!("ytinfo sent malformed json: {}", e);
            Error::ExtractionFailed(format!("ytinfo sent malformed json: {}", e))
        })?;

        if !envelope.success {
            let message = envelope
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Failed to get video info".to_string());
            error!("ytinfo reported failure: {}", message);
            return Err(Error::ExtractionFailed(message));
        }

        Ok(VideoInfo {
            title: envelope.title,
            uploader: envelope.uploader,
            thumbnail: envelope.thumbnail,
            duration: envelope.duration,
            audio_formats: envelope.audio_formats,
            video_formats: envelope.video_formats,
        })
    }

    async fn resolve_download(
        &self,
        url: &str,
        format_id: &str,
        media_type: &str,
    ) -> AppResult<ResolvedDownload> {
        info!(
            "resolving youtube download for {} (format {}, type {})",
            url, format_id, media_type
        );

        let response = self
            .http
            .get(format!("{}/api/downloader/ytdown", self.api_base))
            .query(&[("url", url), ("format_id", format_id), ("type", media_type)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("ytdown request failed: {}", e);
                Error::ExtractionFailed(format!("ytdown request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            error!("ytdown responded with status {}", status);
            return Err(Error::ExtractionFailed(format!(
                "API responded with status: {}",
                status
            )));
        }

        let envelope: YtdownEnvelope = response.json().await.map_err(|e| {
            error!("ytdown sent malformed json: {}", e);
            Error::ExtractionFailed(format!("ytdown sent malformed json: {}", e))
        })?;

        if !envelope.success {
            let message = envelope
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Failed to get download link".to_string());
            error!("ytdown reported failure: {}", message);
            return Err(Error::ExtractionFailed(message));
        }

        // the resolver hands out links relative to its own host
        let mut download_url = envelope.download_url.unwrap_or_default();
        if download_url.starts_with('/') {
            download_url = format!("{}{}", self.api_base, download_url);
        }

        Ok(ResolvedDownload {
            download_url,
            filename: envelope.filename,
            filesize: envelope.filesize,
            title: envelope.title,
            media_type: envelope.media_type,
            expires_in: envelope.expires_in,
        })
    }
}
