use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::server::dtos::instagram_dto::{InstagramMediaItem, InstagramPost};
use crate::server::error::{AppResult, Error};
use crate::server::services::GIMITA_API_BASE;

const INSTAGRAM_OEMBED_ENDPOINT: &str = "https://www.instagram.com/api/v1/oembed/";

/// instagram blocks the usual browser string on its oembed api but accepts
/// this shorter one
const OEMBED_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub type DynInstagramService = Arc<dyn InstagramServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait InstagramServiceTrait {
    /// resolve a post url into its downloadable media items
    async fn fetch_post(&self, url: &str) -> AppResult<InstagramPost>;
}

pub struct InstagramService {
    http: reqwest::Client,
    api_base: String,
    oembed_endpoint: String,
}

impl InstagramService {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_endpoints(http, GIMITA_API_BASE, INSTAGRAM_OEMBED_ENDPOINT)
    }

    /// endpoint overrides so tests can point the service at local stubs
    pub fn with_endpoints(
        http: reqwest::Client,
        api_base: impl Into<String>,
        oembed_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            oembed_endpoint: oembed_endpoint.into(),
        }
    }

    /// best-effort post metadata from instagram's oembed api, used only to
    /// enrich the listing so failures are swallowed
    async fn fetch_oembed(&self, url: &str) -> Option<InstagramOembed> {
        let response = self
            .http
            .get(&self.oembed_endpoint)
            .query(&[("url", url)])
            .header("User-Agent", OEMBED_USER_AGENT)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| debug!("instagram oembed lookup failed: {}", e))
            .ok()?;

        if !response.status().is_success() {
            debug!("instagram oembed returned status {}", response.status());
            return None;
        }

        response
            .json()
            .await
            .map_err(|e| debug!("instagram oembed sent malformed json: {}", e))
            .ok()
    }
}

#[derive(Debug, Deserialize)]
struct InstagramEnvelope {
    data: Option<Vec<RawMediaItem>>,
}

#[derive(Debug, Deserialize)]
struct RawMediaItem {
    ext: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
    url: Option<String>,
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InstagramOembed {
    thumbnail_url: Option<String>,
    title: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[async_trait]
impl InstagramServiceTrait for InstagramService {
    async fn fetch_post(&self, url: &str) -> AppResult<InstagramPost> {
        info!("fetching instagram post for {}", url);

        let response = self
            .http
            .get(format!("{}/api/downloader/instagram", self.api_base))
            .query(&[("url", url)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("instagram resolver request failed: {}", e);
                Error::ExtractionFailed(format!("instagram resolver request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            error!("instagram resolver responded with status {}", status);
            return Err(Error::ExtractionFailed(format!(
                "API responded with status: {}",
                status
            )));
        }

        let envelope: InstagramEnvelope = response.json().await.map_err(|e| {
            error!("instagram resolver sent malformed json: {}", e);
            Error::ExtractionFailed(format!("instagram resolver sent malformed json: {}", e))
        })?;

        let oembed = self.fetch_oembed(url).await;
        let post_thumbnail = oembed
            .as_ref()
            .and_then(|o| non_empty(o.thumbnail_url.clone()))
            .unwrap_or_default();
        let title = oembed
            .and_then(|o| non_empty(o.title))
            .unwrap_or_default();

        let items = envelope
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|item| {
                let thumbnail = non_empty(item.thumbnail)
                    .unwrap_or_else(|| post_thumbnail.clone());
                InstagramMediaItem {
                    ext: non_empty(item.ext).unwrap_or_else(|| "mp4".to_string()),
                    name: non_empty(item.name)
                        .unwrap_or_else(|| "Instagram Media".to_string()),
                    media_type: non_empty(item.media_type)
                        .unwrap_or_else(|| "video".to_string()),
                    url: item.url.unwrap_or_default(),
                    thumbnail,
                }
            })
            .collect();

        Ok(InstagramPost {
            items,
            thumbnail: post_thumbnail,
            title,
        })
    }
}
