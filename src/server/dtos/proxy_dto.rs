use serde::Deserialize;

/// `url` stays optional so a missing parameter gets our envelope instead of
/// the extractor's default rejection
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailQuery {
    pub url: Option<String>,
}
