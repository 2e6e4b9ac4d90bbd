use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::platform::Platform;
use crate::server::dtos::media_dto::{MediaStats, NormalizedMedia};
use crate::server::error::{AppResult, Error};
use crate::server::services::response_cache_services::DynResponseCacheService;

const TIKWM_ENDPOINT: &str = "https://www.tikwm.com/api/";
const TIKWM_ATTEMPTS: u32 = 2;
const TIKWM_RETRY_DELAY: Duration = Duration::from_secs(2);
const TIKWM_TIMEOUT: Duration = Duration::from_secs(8);

const OEMBED_ENDPOINT: &str = "https://www.tiktok.com/oembed";
const OEMBED_TIMEOUT: Duration = Duration::from_secs(5);

/// worded for end users because when every extractor strikes out it is
/// usually their video that is private or gone
pub const EXTRACTORS_EXHAUSTED_MESSAGE: &str = "Unable to fetch video. Please try again in a few \
     seconds. If the problem persists, the video may be private or unavailable.";

pub type DynTikTokService = Arc<dyn TikTokServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait TikTokServiceTrait {
    /// resolve a tiktok page url into a media record, via the cache or the
    /// extractor chain
    async fn fetch_media(&self, url: &str) -> AppResult<NormalizedMedia>;
}

pub type DynMediaStrategy = Arc<dyn MediaStrategy + Send + Sync>;

/// one way of turning a tiktok page url into a media record. strategies run
/// in declaration order and each gets `attempts` tries, with `retry_delay`
/// between tries of the same strategy, before the next one takes over.
#[automock]
#[async_trait]
pub trait MediaStrategy {
    fn name(&self) -> &'static str;

    fn attempts(&self) -> u32;

    fn retry_delay(&self) -> Duration;

    async fn attempt(&self, url: &str) -> AppResult<NormalizedMedia>;
}

/// primary extractor backed by the tikwm.com resolver. returns watermark-free
/// media urls plus engagement counters.
pub struct TikwmStrategy {
    http: reqwest::Client,
    endpoint: String,
}

impl TikwmStrategy {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_endpoint(http, TIKWM_ENDPOINT)
    }

    /// endpoint override so tests can point the strategy at a local stub
    pub fn with_endpoint(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TikwmEnvelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<TikwmData>,
}

/// the resolver duplicates its counters, sometimes top-level and sometimes
/// under a nested stats block, so both shapes are kept
#[derive(Debug, Deserialize)]
struct TikwmData {
    #[serde(default)]
    title: String,
    play: Option<String>,
    hdplay: Option<String>,
    music: Option<String>,
    cover: Option<String>,
    origin_cover: Option<String>,
    author: Option<TikwmAuthor>,
    music_info: Option<TikwmMusicInfo>,
    digg_count: Option<i64>,
    share_count: Option<i64>,
    collect_count: Option<i64>,
    play_count: Option<i64>,
    stats: Option<TikwmCounters>,
}

#[derive(Debug, Deserialize)]
struct TikwmAuthor {
    unique_id: Option<String>,
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TikwmMusicInfo {
    play_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TikwmCounters {
    digg_count: Option<i64>,
    share_count: Option<i64>,
    collect_count: Option<i64>,
    play_count: Option<i64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TikwmData {
    /// maps the resolver payload into our record, `None` when neither the
    /// plain nor the hd rendition carries a usable url
    fn normalize(self) -> Option<NormalizedMedia> {
        let download_url =
            non_empty(self.play.clone()).or_else(|| non_empty(self.hdplay.clone()))?;

        let author = self
            .author
            .as_ref()
            .and_then(|a| non_empty(a.unique_id.clone()))
            .or_else(|| self.author.as_ref().and_then(|a| non_empty(a.nickname.clone())))
            .unwrap_or_else(|| "Unknown".to_string());

        let title = if self.title.is_empty() {
            "TikTok Video".to_string()
        } else {
            self.title.clone()
        };

        let thumbnail_url = non_empty(self.cover.clone())
            .or_else(|| non_empty(self.origin_cover.clone()))
            .unwrap_or_default();

        let audio_url = non_empty(self.music.clone())
            .or_else(|| {
                self.music_info
                    .as_ref()
                    .and_then(|m| non_empty(m.play_url.clone()))
            })
            .unwrap_or_default();

        let counters = self.stats.as_ref();
        let stats = MediaStats {
            likes: self
                .digg_count
                .or_else(|| counters.and_then(|c| c.digg_count))
                .map(|n| n.to_string()),
            shares: self
                .share_count
                .or_else(|| counters.and_then(|c| c.share_count))
                .map(|n| n.to_string()),
            saves: self
                .collect_count
                .or_else(|| counters.and_then(|c| c.collect_count))
                .map(|n| n.to_string()),
            views: self
                .play_count
                .or_else(|| counters.and_then(|c| c.play_count))
                .map(|n| n.to_string()),
        };

        Some(NormalizedMedia {
            title,
            author,
            thumbnail_url,
            download_url,
            audio_url,
            stats: Some(stats),
        })
    }
}

#[async_trait]
impl MediaStrategy for TikwmStrategy {
    fn name(&self) -> &'static str {
        "tikwm"
    }

    fn attempts(&self) -> u32 {
        TIKWM_ATTEMPTS
    }

    fn retry_delay(&self) -> Duration {
        TIKWM_RETRY_DELAY
    }

    async fn attempt(&self, url: &str) -> AppResult<NormalizedMedia> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("url", url), ("hd", "1")])
            .header("Accept", "application/json")
            .timeout(TIKWM_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                warn!("tikwm request failed: {}", e);
                Error::UpstreamUnavailable {
                    surface_status: None,
                    message: format!("tikwm request failed: {}", e),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("tikwm returned status {}", status);
            return Err(Error::UpstreamUnavailable {
                surface_status: None,
                message: format!("tikwm returned status {}", status),
            });
        }

        let envelope: TikwmEnvelope = response.json().await.map_err(|e| {
            warn!("tikwm sent malformed json: {}", e);
            Error::UpstreamUnavailable {
                surface_status: None,
                message: format!("tikwm sent malformed json: {}", e),
            }
        })?;

        if envelope.code != 0 {
            warn!(
                "tikwm rejected the link (code {}): {}",
                envelope.code, envelope.msg
            );
            return Err(Error::UpstreamUnavailable {
                surface_status: None,
                message: format!("tikwm rejected the link (code {})", envelope.code),
            });
        }

        envelope
            .data
            .and_then(TikwmData::normalize)
            .ok_or_else(|| {
                warn!("tikwm response had no playable url");
                Error::UpstreamUnavailable {
                    surface_status: None,
                    message: "tikwm response had no playable url".to_string(),
                }
            })
    }
}

/// fallback extractor built on tiktok's public oembed endpoint. only yields
/// page metadata, the download url it reports is the original page link.
pub struct OembedStrategy {
    http: reqwest::Client,
    endpoint: String,
}

impl OembedStrategy {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_endpoint(http, OEMBED_ENDPOINT)
    }

    pub fn with_endpoint(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OembedEnvelope {
    title: Option<String>,
    author_name: Option<String>,
    thumbnail_url: Option<String>,
}

#[async_trait]
impl MediaStrategy for OembedStrategy {
    fn name(&self) -> &'static str {
        "oembed"
    }

    fn attempts(&self) -> u32 {
        1
    }

    fn retry_delay(&self) -> Duration {
        Duration::ZERO
    }

    async fn attempt(&self, url: &str) -> AppResult<NormalizedMedia> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("url", url)])
            .header("Accept", "application/json")
            .timeout(OEMBED_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                warn!("tiktok oembed request failed: {}", e);
                Error::UpstreamUnavailable {
                    surface_status: None,
                    message: format!("tiktok oembed request failed: {}", e),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("tiktok oembed returned status {}", status);
            return Err(Error::UpstreamUnavailable {
                surface_status: None,
                message: format!("tiktok oembed returned status {}", status),
            });
        }

        let envelope: OembedEnvelope = response.json().await.map_err(|e| {
            warn!("tiktok oembed sent malformed json: {}", e);
            Error::UpstreamUnavailable {
                surface_status: None,
                message: format!("tiktok oembed sent malformed json: {}", e),
            }
        })?;

        let (Some(title), Some(author)) = (
            non_empty(envelope.title),
            non_empty(envelope.author_name),
        ) else {
            warn!("tiktok oembed response missing title or author");
            return Err(Error::UpstreamUnavailable {
                surface_status: None,
                message: "tiktok oembed response missing title or author".to_string(),
            });
        };

        Ok(NormalizedMedia {
            title,
            author,
            thumbnail_url: envelope.thumbnail_url.unwrap_or_default(),
            // no direct media url here, the frontend falls back to linking
            // the page itself
            download_url: url.to_string(),
            audio_url: String::new(),
            stats: None,
        })
    }
}

pub struct TikTokService {
    cache: DynResponseCacheService,
    strategies: Vec<DynMediaStrategy>,
}

impl TikTokService {
    pub fn new(http: reqwest::Client, cache: DynResponseCacheService) -> Self {
        Self::with_strategies(
            cache,
            vec![
                Arc::new(TikwmStrategy::new(http.clone())),
                Arc::new(OembedStrategy::new(http)),
            ],
        )
    }

    /// strategy override so tests can drive the chain with stubs
    pub fn with_strategies(
        cache: DynResponseCacheService,
        strategies: Vec<DynMediaStrategy>,
    ) -> Self {
        Self { cache, strategies }
    }
}

#[async_trait]
impl TikTokServiceTrait for TikTokService {
    async fn fetch_media(&self, url: &str) -> AppResult<NormalizedMedia> {
        let platform = Platform::TikTok.as_str();

        if let Some(cached) = self.cache.get_media(platform, url).await {
            return Ok(cached);
        }

        let mut last_error: Option<Error> = None;

        for strategy in &self.strategies {
            for attempt in 0..strategy.attempts() {
                if attempt > 0 {
                    tokio::time::sleep(strategy.retry_delay()).await;
                }

                debug!(
                    "extractor {} attempt {}/{} for {}",
                    strategy.name(),
                    attempt + 1,
                    strategy.attempts(),
                    url
                );

                match strategy.attempt(url).await {
                    Ok(media) => {
                        info!("extractor {} resolved {}", strategy.name(), url);
                        let media = media.sanitized();
                        self.cache.store_media(platform, url, &media).await;
                        return Ok(media);
                    }
                    Err(e) => {
                        last_error = Some(e);
                    }
                }
            }
        }

        let detail = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no extractors configured".to_string());
        warn!("every extractor failed for {}: {}", url, detail);
        Err(Error::ExtractionFailed(
            EXTRACTORS_EXHAUSTED_MESSAGE.to_string(),
        ))
    }
}
