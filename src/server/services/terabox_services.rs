use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Deserialize;
use tracing::{error, info};

use crate::server::dtos::terabox_dto::{TeraboxFile, TeraboxListing};
use crate::server::error::{AppResult, Error};
use crate::server::services::GIMITA_API_BASE;

pub type DynTeraboxService = Arc<dyn TeraboxServiceTrait + Send + Sync>;

#[automock]
#[async_trait]
pub trait TeraboxServiceTrait {
    /// resolve a share link into its file listing
    async fn fetch_files(&self, url: &str) -> AppResult<TeraboxListing>;
}

pub struct TeraboxService {
    http: reqwest::Client,
    api_base: String,
}

impl TeraboxService {
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
struct TeraboxEnvelope {
    files: Option<Vec<TeraboxFile>>,
    total: Option<usize>,
}

#[async_trait]
impl TeraboxServiceTrait for TeraboxService {
    async fn fetch_files(&self, url: &str) -> AppResult<TeraboxListing> {
        info!("fetching terabox listing for {}", url);

        let response = self
            .http
            .get(format!("{}/api/downloader/terabox", self.api_base))
            .query(&[("url", url)])
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("terabox resolver request failed: {}", e);
                Error::ExtractionFailed(format!("terabox resolver request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            error!("terabox resolver responded with status {}", status);
            return Err(Error::ExtractionFailed(format!(
                "API responded with status: {}",
                status
            )));
        }

        let envelope: TeraboxEnvelope = response.json().await.map_err(|e| {
            error!("terabox resolver sent malformed json: {}", e);
            Error::ExtractionFailed(format!("terabox resolver sent malformed json: {}", e))
        })?;

        Ok(TeraboxListing {
            files: envelope.files.unwrap_or_default(),
            total: envelope.total.unwrap_or(0),
        })
    }
}
