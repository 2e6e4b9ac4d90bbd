use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::server::dtos::media_dto::NormalizedMedia;
use crate::store::TtlCache;

const MEDIA_TTL: Duration = Duration::from_secs(10 * 60);

pub type DynResponseCacheService = Arc<dyn ResponseCacheServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait ResponseCacheServiceTrait {
    /// look up a previously extracted record for this platform and url
    async fn get_media(&self, platform: &str, url: &str) -> Option<NormalizedMedia>;

    /// store an extracted record under its platform and url fingerprint
    async fn store_media(&self, platform: &str, url: &str, media: &NormalizedMedia);

    /// drop entries past their ttl, returning how many were removed
    async fn sweep_expired(&self) -> usize;

    /// number of live entries
    async fn entry_count(&self) -> usize;
}

/// in-process cache for extraction results. a repeat request inside the ttl
/// never touches the upstream apis, which is what keeps tikwm from rate
/// limiting us during traffic spikes.
pub struct MemoryResponseCacheService {
    media: TtlCache<NormalizedMedia>,
}

impl MemoryResponseCacheService {
    pub fn new() -> Self {
        Self::with_ttl(MEDIA_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            media: TtlCache::new(ttl),
        }
    }

    fn media_key(platform: &str, url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(platform.as_bytes());
        hasher.update(b":");
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl Default for MemoryResponseCacheService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseCacheServiceTrait for MemoryResponseCacheService {
    async fn get_media(&self, platform: &str, url: &str) -> Option<NormalizedMedia> {
        let hit = self.media.get(&Self::media_key(platform, url));
        if hit.is_some() {
            debug!("response cache HIT ({}) for {}", platform, url);
        }
        hit
    }

    async fn store_media(&self, platform: &str, url: &str, media: &NormalizedMedia) {
        self.media
            .insert(&Self::media_key(platform, url), media.clone());
        debug!(
            "cached extraction result ({}) for {} (ttl {}s)",
            platform,
            url,
            MEDIA_TTL.as_secs()
        );
    }

    async fn sweep_expired(&self) -> usize {
        let removed = self.media.sweep_expired();
        if removed > 0 {
            debug!("response cache sweep removed {} expired entries", removed);
        }
        removed
    }

    async fn entry_count(&self) -> usize {
        self.media.len()
    }
}
