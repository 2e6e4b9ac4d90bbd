use serde::{Deserialize, Serialize};

/// One downloadable asset inside an Instagram post. Carousels produce
/// several of these, single posts exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstagramMediaItem {
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub thumbnail: String,
}

/// Everything the extractor knows about a post: its media items plus the
/// post-level thumbnail and caption (both may be empty).
#[derive(Debug, Clone, PartialEq)]
pub struct InstagramPost {
    pub items: Vec<InstagramMediaItem>,
    pub thumbnail: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct InstagramResponse {
    pub success: bool,
    pub data: Vec<InstagramMediaItem>,
    pub thumbnail: String,
    pub title: String,
}
