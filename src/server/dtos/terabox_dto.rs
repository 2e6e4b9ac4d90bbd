use serde::{Deserialize, Serialize};

/// A single shared file listed by the Terabox resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeraboxFile {
    #[serde(default)]
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_format: Option<String>,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_link: Option<String>,
}

/// What the resolver knows about a share link before the thumbnails are
/// rewritten for the frontend.
#[derive(Debug, Clone, PartialEq)]
pub struct TeraboxListing {
    pub files: Vec<TeraboxFile>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TeraboxResponse {
    pub success: bool,
    pub files: Vec<TeraboxFile>,
    pub total: usize,
}
