use axum::body::to_bytes;
use axum::http::StatusCode;
use saveclip::platform::Platform;
use saveclip::server::api::proxy_controller::ProxyController;
use saveclip::server::error::Error;

#[tokio::test]
async fn test_streams_media_with_download_headers() {
    let mut server = mockito::Server::new_async().await;
    let payload = vec![0u8; 64];

    let mock = server
        .mock("GET", "/video.mp4")
        .with_status(200)
        .with_header("content-type", "video/mp4")
        .with_body(payload.clone())
        .create_async()
        .await;

    let response =
        ProxyController::fetch_and_stream(&format!("{}/video.mp4", server.url()), "clip.mp4")
            .await
            .unwrap();

    mock.assert_async().await;

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers["content-type"], "video/mp4");
    assert_eq!(
        headers["content-disposition"],
        "attachment; filename=\"clip.mp4\""
    );
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["content-length"], "64");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.as_ref(), payload.as_slice());
}

#[tokio::test]
async fn test_download_content_type_follows_the_filename() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/track")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(vec![1u8; 16])
        .create_async()
        .await;

    let response =
        ProxyController::fetch_and_stream(&format!("{}/track", server.url()), "song.mp3")
            .await
            .unwrap();

    assert_eq!(response.headers()["content-type"], "audio/mpeg");
}

#[tokio::test]
async fn test_refuses_html_masquerading_as_media() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/video.mp4")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body("<html>link expired</html>")
        .create_async()
        .await;

    match ProxyController::fetch_and_stream(&format!("{}/video.mp4", server.url()), "download")
        .await
    {
        Err(Error::InvalidSource(message)) => {
            assert_eq!(message, "Download link expired or invalid. Please try again.")
        }
        other => panic!("expected an invalid source error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forwards_the_upstream_error_status() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/video.mp4")
        .with_status(403)
        .create_async()
        .await;

    match ProxyController::fetch_and_stream(&format!("{}/video.mp4", server.url()), "download")
        .await
    {
        Err(Error::UpstreamUnavailable {
            surface_status,
            message,
        }) => {
            assert_eq!(surface_status, Some(StatusCode::FORBIDDEN));
            assert_eq!(message, "Failed to fetch: 403");
        }
        other => panic!("expected an upstream error, got {:?}", other),
    }
}

#[test]
fn test_media_urls_must_be_allowlisted() {
    assert!(ProxyController::validate_media_url("https://v16m.tiktokcdn.com/video.mp4").is_ok());
    assert!(
        ProxyController::validate_media_url("https://www.tikwm.com/video/media/play/123.mp4")
            .is_ok()
    );
    assert!(
        ProxyController::validate_media_url("https://scontent.cdninstagram.com/v/clip.mp4").is_ok()
    );

    // unknown hosts, private hosts and odd schemes all read as a bad url
    assert!(matches!(
        ProxyController::validate_media_url("https://evil.example.com/clip.mp4"),
        Err(Error::InvalidUrl(_))
    ));
    assert!(matches!(
        ProxyController::validate_media_url("http://127.0.0.1/clip.mp4"),
        Err(Error::InvalidUrl(_))
    ));
    assert!(matches!(
        ProxyController::validate_media_url("ftp://tikwm.com/clip.mp4"),
        Err(Error::InvalidUrl(_))
    ));
    assert!(matches!(
        ProxyController::validate_media_url("not a url"),
        Err(Error::InvalidUrl(_))
    ));
}

#[test]
fn test_thumbnail_urls_are_scoped_per_platform() {
    assert!(
        ProxyController::validate_thumbnail_url(
            Platform::YouTube,
            "https://i.ytimg.com/vi/abc/hqdefault.jpg"
        )
        .is_ok()
    );
    assert!(
        ProxyController::validate_thumbnail_url(
            Platform::YouTube,
            "https://img.youtube.com/vi/abc/0.jpg"
        )
        .is_ok()
    );

    // a youtube thumbnail may not come from an instagram cdn
    assert!(
        ProxyController::validate_thumbnail_url(
            Platform::YouTube,
            "https://scontent.cdninstagram.com/t/thumb.jpg"
        )
        .is_err()
    );
    assert!(
        ProxyController::validate_thumbnail_url(
            Platform::Instagram,
            "https://scontent.cdninstagram.com/t/thumb.jpg"
        )
        .is_ok()
    );
    assert!(
        ProxyController::validate_thumbnail_url(
            Platform::Terabox,
            "https://data.terabox.com/thumbnail/x.jpg"
        )
        .is_ok()
    );
}

#[test]
fn test_thumbnail_urls_are_rewritten_onto_the_proxy_route() {
    assert_eq!(
        ProxyController::proxied_thumbnail_url(
            Platform::YouTube,
            "https://i.ytimg.com/vi/a/hq.jpg"
        ),
        "/api/youtube/thumbnail?url=https%3A%2F%2Fi.ytimg.com%2Fvi%2Fa%2Fhq.jpg"
    );

    // empty stays empty instead of pointing at a broken route
    assert_eq!(
        ProxyController::proxied_thumbnail_url(Platform::Instagram, ""),
        ""
    );
}

#[tokio::test]
async fn test_thumbnails_come_back_cacheable() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/thumb.jpg")
        .with_status(200)
        .with_header("content-type", "image/webp")
        .with_body(vec![2u8; 32])
        .create_async()
        .await;

    let response =
        ProxyController::fetch_thumbnail(Platform::YouTube, &format!("{}/thumb.jpg", server.url()))
            .await
            .unwrap();

    mock.assert_async().await;

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers["content-type"], "image/webp");
    assert_eq!(headers["cache-control"], "public, max-age=86400");
    assert_eq!(headers["access-control-allow-origin"], "*");

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.len(), 32);
}

#[tokio::test]
async fn test_thumbnail_content_type_defaults_to_jpeg() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/thumb")
        .with_status(200)
        .with_body(vec![3u8; 8])
        .create_async()
        .await;

    let response =
        ProxyController::fetch_thumbnail(Platform::Terabox, &format!("{}/thumb", server.url()))
            .await
            .unwrap();

    assert_eq!(response.headers()["content-type"], "image/jpeg");
}

#[tokio::test]
async fn test_thumbnail_upstream_failure_keeps_the_status() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/thumb.jpg")
        .with_status(404)
        .create_async()
        .await;

    match ProxyController::fetch_thumbnail(
        Platform::Instagram,
        &format!("{}/thumb.jpg", server.url()),
    )
    .await
    {
        Err(Error::UpstreamUnavailable {
            surface_status,
            message,
        }) => {
            assert_eq!(surface_status, Some(StatusCode::NOT_FOUND));
            assert_eq!(message, "Failed to fetch thumbnail");
        }
        other => panic!("expected an upstream error, got {:?}", other),
    }
}
