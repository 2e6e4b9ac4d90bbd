use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use tracing::{error, info};

use crate::server::dtos::facebook_dto::FacebookVideo;
use crate::server::error::{AppResult, Error};
use crate::server::services::GIMITA_API_BASE;

pub type DynFacebookService = Arc<dyn FacebookServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait FacebookServiceTrait {
    /// resolve a video url into its quality variants
    async fn fetch_video(&self, url: &str) -> AppResult<FacebookVideo>;
}

pub struct FacebookService {
    http: reqwest::Client,
    api_base: String,
}

impl FacebookService {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_api_base(http, GIMITA_API_BASE)
    }

    pub fn with_api_base(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FacebookEnvelope {
    data: Option<FacebookVideo>,
}

#[async_trait]
impl FacebookServiceTrait for FacebookService {
    async fn fetch_video(&self, url: &str) -> AppResult<FacebookVideo> {
        info!("fetching facebook video for {}", url);

        let response = self
            .http
            .get(format!("{}/api/downloader/facebook", self.api_base))
            .query(&[("url", url)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("facebook resolver request failed: {}", e);
                Error::ExtractionFailed(format!("facebook resolver request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            error!("facebook resolver responded with status {}", status);
            return Err(Error::ExtractionFailed(format!(
                "API responded with status: {}",
                status
            )));
        }

        let envelope: FacebookEnvelope = response.json().await.map_err(|e| {
            error!("facebook resolver sent malformed json: {}", e);
            Error::ExtractionFailed(format!("facebook resolver sent malformed json: {}", e))
        })?;

        envelope.data.ok_or_else(|| {
            error!("facebook resolver returned no data for {}", url);
            Error::ExtractionFailed("facebook resolver returned no data".to_string())
        })
    }
}
