pub mod facebook_dto;
pub mod health_dto;
pub mod instagram_dto;
pub mod media_dto;
pub mod proxy_dto;
pub mod terabox_dto;
pub mod youtube_dto;
