use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::server::utils::sanitize_utils::truncate_chars;
use crate::server::utils::validation_utils::MAX_URL_LENGTH;

const MAX_TITLE_CHARS: usize = 500;
const MAX_AUTHOR_CHARS: usize = 100;
const MAX_LINK_CHARS: usize = 500;

/// Request body accepted by every `POST /api/<platform>` handler.
///
/// `action`, `format_id` and `type` are only meaningful for the YouTube
/// route; the other platforms ignore them.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DownloadRequest {
    #[serde(default)]
    #[validate(custom(function = validate_url_field))]
    pub url: String,
    pub action: Option<String>,
    pub format_id: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

fn validate_url_field(url: &str) -> Result<(), ValidationError> {
    if url.trim().is_empty() {
        let mut error = ValidationError::new("url_required");
        error.message = Some("URL is required".into());
        return Err(error);
    }

    if url.len() > MAX_URL_LENGTH {
        let mut error = ValidationError::new("url_too_long");
        error.message = Some("URL too long. Maximum 2048 characters".into());
        return Err(error);
    }

    Ok(())
}

/// Canonical media record produced by the extraction strategies.
///
/// `audio_url` is an empty string when the source has no separate audio
/// track, matching what the frontend expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMedia {
    pub title: String,
    pub author: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<MediaStats>,
}

impl NormalizedMedia {
    /// Caps every field to a sane length before the record gets cached or
    /// serialized, so a hostile upstream cannot balloon our responses.
    pub fn sanitized(mut self) -> Self {
        self.title = truncate_chars(&self.title, MAX_TITLE_CHARS);
        self.author = truncate_chars(&self.author, MAX_AUTHOR_CHARS);
        self.thumbnail_url = truncate_chars(&self.thumbnail_url, MAX_LINK_CHARS);
        self.download_url = truncate_chars(&self.download_url, MAX_LINK_CHARS);
        self.audio_url = truncate_chars(&self.audio_url, MAX_LINK_CHARS);
        self
    }
}

/// Engagement counters, stringified because the frontend renders them
/// verbatim. Absent counters are omitted from the payload entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shares: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saves: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MediaResponse {
    pub success: bool,
    pub data: NormalizedMedia,
}

impl MediaResponse {
    pub fn new(data: NormalizedMedia) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
