use serde::{Deserialize, Serialize};

/// Quality variants for a Facebook video. Forwarded to the client as-is,
/// which is why the upstream shape and the response shape are one struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookVideo {
    #[serde(default)]
    pub all_qualities: Vec<FacebookQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_quality: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacebookQuality {
    #[serde(default)]
    pub resolution: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct FacebookResponse {
    pub success: bool,
    pub data: FacebookVideo,
}
