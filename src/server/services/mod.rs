pub mod app_services;
pub mod facebook_services;
pub mod instagram_services;
pub mod rate_limit_services;
pub mod response_cache_services;
pub mod terabox_services;
pub mod tiktok_services;
pub mod youtube_services;

pub use facebook_services::DynFacebookService;
pub use instagram_services::DynInstagramService;
pub use rate_limit_services::DynRateLimitService;
pub use response_cache_services::DynResponseCacheService;
pub use terabox_services::DynTeraboxService;
pub use tiktok_services::DynTikTokService;
pub use youtube_services::DynYouTubeService;

/// base of the third-party resolver behind the youtube, instagram, facebook
/// and terabox routes
pub const GIMITA_API_BASE: &str = "https://api.gimita.id";
