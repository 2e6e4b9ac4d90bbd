use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router, ServiceExt, extract::Request, middleware};
use once_cell::sync::{Lazy, OnceCell};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tower::Layer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, CargoEnv};

use self::api::facebook_controller::FacebookController;
use self::api::health_controller;
use self::api::instagram_controller::InstagramController;
use self::api::proxy_controller::ProxyController;
use self::api::terabox_controller::TeraboxController;
use self::api::tiktok_controller::TikTokController;
use self::api::youtube_controller::YouTubeController;
use self::services::app_services::AppServices;

pub mod api;
pub mod dtos;
pub mod error;
pub mod extractors;
pub mod services;
pub mod utils;

/// how often the background sweeper clears expired rate windows and cache
/// entries
const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

static UPTIME: Lazy<Instant> = Lazy::new(Instant::now);
static RUNTIME_ENV: OnceCell<CargoEnv> = OnceCell::new();

/// record the environment once at startup so error rendering and the user
/// agent gate can check it without threading config everywhere
pub fn init_runtime_env(cargo_env: CargoEnv) {
    // tests call serve-adjacent code repeatedly, later calls are a no-op
    let _ = RUNTIME_ENV.set(cargo_env);
}

pub fn is_production() -> bool {
    matches!(RUNTIME_ENV.get(), Some(CargoEnv::Production))
}

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub fn get_uptime_seconds() -> u64 {
    UPTIME.elapsed().as_secs()
}

pub struct ApplicationServer;

impl ApplicationServer {
    /// the full /api surface with its shared layers. separate from serve so
    /// tests can push requests through the real middleware stack without
    /// binding a socket
    pub fn router(config: &AppConfig, services: AppServices) -> Router {
        Router::new()
            .route("/api/health", get(health_controller::health_endpoint))
            .nest("/api/download", TikTokController::app())
            .nest("/api/youtube", YouTubeController::app())
            .nest("/api/instagram", InstagramController::app())
            .nest("/api/facebook", FacebookController::app())
            .nest("/api/terabox", TeraboxController::app())
            .nest("/api/proxy", ProxyController::app())
            .layer(middleware::from_fn(Self::security_headers))
            .layer(Self::cors_layer(config))
            .layer(Extension(services))
            .layer(TraceLayer::new_for_http())
    }

    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        init_runtime_env(config.cargo_env);
        Lazy::force(&UPTIME);

        let services = AppServices::new(config.clone());
        let sweeper = Self::spawn_sweeper(services.clone());

        let router = Self::router(&config, services);

        // accept /api/proxy/ the same as /api/proxy
        let app = NormalizePathLayer::trim_trailing_slash().layer(router);

        let address = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(&address)
            .await
            .context("Failed to bind server address")?;

        info!("server listening on {}", address);

        axum::serve(
            listener,
            ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
        )
        .with_graceful_shutdown(Self::shutdown_signal())
        .await
        .context("Failed to start server")?;

        sweeper.abort();
        info!("server stopped");

        Ok(())
    }

    /// "*" opens the api up entirely, anything else is treated as a comma
    /// separated allow-list shared across the main and preview frontends
    fn cors_layer(config: &AppConfig) -> CorsLayer {
        let mut origins = Vec::new();

        for origin in config
            .cors_origin
            .split(',')
            .chain(config.preview_cors_origin.split(','))
        {
            let origin = origin.trim();
            if origin == "*" {
                return CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers(Any);
            }
            if origin.is_empty() {
                continue;
            }
            match origin.parse::<HeaderValue>() {
                Ok(value) => origins.push(value),
                Err(_) => warn!("skipping unparseable cors origin {:?}", origin),
            }
        }

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    }

    async fn security_headers(request: Request, next: Next) -> Response {
        let mut response = next.run(request).await;

        let headers = response.headers_mut();
        headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
        headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
        headers.insert("X-XSS-Protection", HeaderValue::from_static("1; mode=block"));
        headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));
        headers.insert(
            "Permissions-Policy",
            HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
        );

        response
    }

    /// periodic cleanup so abandoned rate windows and stale cache entries do
    /// not pile up between requests
    fn spawn_sweeper(services: AppServices) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            // the first tick completes immediately, skip it
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let dropped_windows = services.rate_limit.sweep_expired().await;
                let dropped_entries = services.response_cache.sweep_expired().await;
                debug!(
                    "sweeper dropped {} rate windows and {} cache entries",
                    dropped_windows, dropped_entries
                );
            }
        })
    }

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("Ctrl+C handler should install");
        };

        #[cfg(unix)]
        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("SIGTERM handler should install")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        info!("shutdown signal received");
    }
}
