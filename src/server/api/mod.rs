pub mod facebook_controller;
pub mod health_controller;
pub mod instagram_controller;
pub mod proxy_controller;
pub mod terabox_controller;
pub mod tiktok_controller;
pub mod youtube_controller;
