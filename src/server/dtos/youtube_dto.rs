use serde::{Deserialize, Serialize};

/// Metadata for a single YouTube video, as returned by the `info` action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub uploader: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub audio_formats: Vec<FormatEntry>,
    #[serde(default)]
    pub video_formats: Vec<FormatEntry>,
}

/// One downloadable rendition. The resolver only needs `format_id`; the
/// rest is display metadata the frontend shows in the format picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatEntry {
    #[serde(default)]
    pub format_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filesize: Option<f64>,
}

/// A resolved, time-limited direct download link for one format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDownload {
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct VideoInfoResponse {
    pub success: bool,
    pub data: VideoInfo,
}

#[derive(Debug, Serialize)]
pub struct ResolvedDownloadResponse {
    pub success: bool,
    pub data: ResolvedDownload,
}
