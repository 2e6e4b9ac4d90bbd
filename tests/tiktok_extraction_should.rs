use std::sync::Arc;
use std::time::Duration;

use saveclip::server::dtos::media_dto::NormalizedMedia;
use saveclip::server::error::Error;
use saveclip::server::services::response_cache_services::{
    DynResponseCacheService, MemoryResponseCacheService,
};
use saveclip::server::services::tiktok_services::{
    DynMediaStrategy, EXTRACTORS_EXHAUSTED_MESSAGE, MediaStrategy, MockMediaStrategy,
    OembedStrategy, TikTokService, TikTokServiceTrait, TikwmStrategy,
};

const PAGE_URL: &str = "https://www.tiktok.com/@creator/video/7234567890123456789";

fn media(title: &str) -> NormalizedMedia {
    NormalizedMedia {
        title: title.to_string(),
        author: "creator".to_string(),
        thumbnail_url: "https://cdn.example/thumb.jpg".to_string(),
        download_url: "https://cdn.example/video.mp4".to_string(),
        audio_url: String::new(),
        stats: None,
    }
}

fn fresh_cache() -> DynResponseCacheService {
    Arc::new(MemoryResponseCacheService::new())
}

fn upstream_error() -> Error {
    Error::UpstreamUnavailable {
        surface_status: None,
        message: "stub failure".to_string(),
    }
}

/// stub strategy with sane defaults, attempt expectations are set per test
fn stub_strategy(name: &'static str, attempts: u32) -> MockMediaStrategy {
    let mut strategy = MockMediaStrategy::new();
    strategy.expect_name().return_const(name);
    strategy.expect_attempts().return_const(attempts);
    strategy.expect_retry_delay().return_const(Duration::ZERO);
    strategy
}

#[tokio::test]
async fn test_primary_success_never_reaches_the_fallback() {
    let expected = media("primary result");

    let mut primary = stub_strategy("primary", 1);
    let served = expected.clone();
    primary
        .expect_attempt()
        .times(1)
        .returning(move |_| Ok(served.clone()));

    let mut fallback = stub_strategy("fallback", 1);
    fallback.expect_attempt().times(0);

    let service = TikTokService::with_strategies(
        fresh_cache(),
        vec![
            Arc::new(primary) as DynMediaStrategy,
            Arc::new(fallback) as DynMediaStrategy,
        ],
    );

    let got = service.fetch_media(PAGE_URL).await.unwrap();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn test_fallback_takes_over_when_the_primary_is_exhausted() {
    let mut primary = stub_strategy("primary", 2);
    primary
        .expect_attempt()
        .times(2)
        .returning(|_| Err(upstream_error()));

    let expected = media("fallback result");
    let mut fallback = stub_strategy("fallback", 1);
    let served = expected.clone();
    fallback
        .expect_attempt()
        .times(1)
        .returning(move |_| Ok(served.clone()));

    let service = TikTokService::with_strategies(
        fresh_cache(),
        vec![
            Arc::new(primary) as DynMediaStrategy,
            Arc::new(fallback) as DynMediaStrategy,
        ],
    );

    let got = service.fetch_media(PAGE_URL).await.unwrap();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn test_strategy_retries_before_moving_on() {
    let mut seq = mockall::Sequence::new();

    let expected = media("second try");
    let mut primary = stub_strategy("primary", 2);
    primary
        .expect_attempt()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(upstream_error()));
    let served = expected.clone();
    primary
        .expect_attempt()
        .times(1)
        .in_sequence(&mut seq)
        .returning(move |_| Ok(served.clone()));

    let mut fallback = stub_strategy("fallback", 1);
    fallback.expect_attempt().times(0);

    let service = TikTokService::with_strategies(
        fresh_cache(),
        vec![
            Arc::new(primary) as DynMediaStrategy,
            Arc::new(fallback) as DynMediaStrategy,
        ],
    );

    let got = service.fetch_media(PAGE_URL).await.unwrap();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn test_exhausting_every_strategy_yields_the_user_facing_message() {
    let mut primary = stub_strategy("primary", 2);
    primary
        .expect_attempt()
        .times(2)
        .returning(|_| Err(upstream_error()));

    let mut fallback = stub_strategy("fallback", 1);
    fallback
        .expect_attempt()
        .times(1)
        .returning(|_| Err(upstream_error()));

    let service = TikTokService::with_strategies(
        fresh_cache(),
        vec![
            Arc::new(primary) as DynMediaStrategy,
            Arc::new(fallback) as DynMediaStrategy,
        ],
    );

    match service.fetch_media(PAGE_URL).await {
        Err(Error::ExtractionFailed(message)) => {
            assert_eq!(message, EXTRACTORS_EXHAUSTED_MESSAGE)
        }
        other => panic!("expected extraction failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_repeat_requests_are_served_from_the_cache() {
    let expected = media("cached result");

    let mut primary = stub_strategy("primary", 1);
    let served = expected.clone();
    primary
        .expect_attempt()
        .times(1)
        .returning(move |_| Ok(served.clone()));

    let service = TikTokService::with_strategies(
        fresh_cache(),
        vec![Arc::new(primary) as DynMediaStrategy],
    );

    let first = service.fetch_media(PAGE_URL).await.unwrap();
    // second resolve must not hit the strategy again, times(1) above proves it
    let second = service.fetch_media(PAGE_URL).await.unwrap();

    assert_eq!(first, expected);
    assert_eq!(second, expected);
}

#[tokio::test]
async fn test_tikwm_maps_the_resolver_payload() {
    let mut server = mockito::Server::new_async().await;

    let body = serde_json::json!({
        "code": 0,
        "msg": "success",
        "data": {
            "title": "my clip",
            "play": "https://cdn.tikwm.com/video/123.mp4",
            "hdplay": "https://cdn.tikwm.com/video/123-hd.mp4",
            "music": "https://cdn.tikwm.com/music/123.mp3",
            "cover": "https://cdn.tikwm.com/cover/123.jpg",
            "author": { "unique_id": "creator.handle", "nickname": "Creator Name" },
            "digg_count": 1200,
            "share_count": 34,
            "collect_count": 56,
            "play_count": 78900
        }
    });

    let mock = server
        .mock("GET", "/api/")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("url".into(), PAGE_URL.into()),
            mockito::Matcher::UrlEncoded("hd".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let strategy =
        TikwmStrategy::with_endpoint(reqwest::Client::new(), format!("{}/api/", server.url()));

    let got = strategy.attempt(PAGE_URL).await.unwrap();

    mock.assert_async().await;

    assert_eq!(got.title, "my clip");
    // the handle wins over the display name
    assert_eq!(got.author, "creator.handle");
    // the plain rendition wins over hd
    assert_eq!(got.download_url, "https://cdn.tikwm.com/video/123.mp4");
    assert_eq!(got.audio_url, "https://cdn.tikwm.com/music/123.mp3");
    assert_eq!(got.thumbnail_url, "https://cdn.tikwm.com/cover/123.jpg");

    let stats = got.stats.unwrap();
    assert_eq!(stats.likes.as_deref(), Some("1200"));
    assert_eq!(stats.shares.as_deref(), Some("34"));
    assert_eq!(stats.saves.as_deref(), Some("56"));
    assert_eq!(stats.views.as_deref(), Some("78900"));
}

#[tokio::test]
async fn test_tikwm_walks_the_fallback_fields() {
    let mut server = mockito::Server::new_async().await;

    // empty strings count as absent, and the counters only exist nested here
    let body = serde_json::json!({
        "code": 0,
        "data": {
            "title": "",
            "play": "",
            "hdplay": "https://cdn.tikwm.com/video/999-hd.mp4",
            "origin_cover": "https://cdn.tikwm.com/origin/999.jpg",
            "author": { "unique_id": "", "nickname": "Display Name" },
            "music_info": { "play_url": "https://cdn.tikwm.com/music/999.mp3" },
            "stats": { "digg_count": 5, "share_count": 6, "collect_count": 7, "play_count": 8 }
        }
    });

    let _mock = server
        .mock("GET", "/api/")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let strategy =
        TikwmStrategy::with_endpoint(reqwest::Client::new(), format!("{}/api/", server.url()));

    let got = strategy.attempt(PAGE_URL).await.unwrap();

    assert_eq!(got.title, "TikTok Video");
    assert_eq!(got.author, "Display Name");
    assert_eq!(got.download_url, "https://cdn.tikwm.com/video/999-hd.mp4");
    assert_eq!(got.thumbnail_url, "https://cdn.tikwm.com/origin/999.jpg");
    assert_eq!(got.audio_url, "https://cdn.tikwm.com/music/999.mp3");

    let stats = got.stats.unwrap();
    assert_eq!(stats.likes.as_deref(), Some("5"));
    assert_eq!(stats.views.as_deref(), Some("8"));
}

#[tokio::test]
async fn test_tikwm_error_code_fails_the_attempt() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/api/")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"code": -1, "msg": "url invalid"}"#)
        .create_async()
        .await;

    let strategy =
        TikwmStrategy::with_endpoint(reqwest::Client::new(), format!("{}/api/", server.url()));

    assert!(matches!(
        strategy.attempt(PAGE_URL).await,
        Err(Error::UpstreamUnavailable {
            surface_status: None,
            ..
        })
    ));
}

#[tokio::test]
async fn test_oembed_maps_page_metadata() {
    let mut server = mockito::Server::new_async().await;

    let body = serde_json::json!({
        "title": "clip title",
        "author_name": "creator",
        "thumbnail_url": "https://p16-sign.tiktokcdn.com/thumb.jpg"
    });

    let mock = server
        .mock("GET", "/oembed")
        .match_query(mockito::Matcher::UrlEncoded("url".into(), PAGE_URL.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;

    let strategy =
        OembedStrategy::with_endpoint(reqwest::Client::new(), format!("{}/oembed", server.url()));

    let got = strategy.attempt(PAGE_URL).await.unwrap();

    mock.assert_async().await;

    assert_eq!(got.title, "clip title");
    assert_eq!(got.author, "creator");
    assert_eq!(got.thumbnail_url, "https://p16-sign.tiktokcdn.com/thumb.jpg");
    // oembed has no media url, the page link stands in
    assert_eq!(got.download_url, PAGE_URL);
    assert_eq!(got.audio_url, "");
    assert!(got.stats.is_none());
}

#[tokio::test]
async fn test_oembed_without_title_or_author_fails_the_attempt() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/oembed")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"title": "clip title"}"#)
        .create_async()
        .await;

    let strategy =
        OembedStrategy::with_endpoint(reqwest::Client::new(), format!("{}/oembed", server.url()));

    assert!(matches!(
        strategy.attempt(PAGE_URL).await,
        Err(Error::UpstreamUnavailable { .. })
    ));
}
