use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use saveclip::{AppConfig, ApplicationServer, Logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(AppConfig::parse());

    // init logger and sentry, guards are kept alive to flush logs and maintain sentry connection
    let _guards = Logger::init(config.cargo_env, config.sentry_dsn.clone());

    // logging is up to you, I like to use info! for general information on what to do
    info!("logger and env prepped...");

    info!("starting server...");

    // serve the routes, everything the handlers need rides along in AppServices
    ApplicationServer::serve(config)
        .await
        .context("server failed to start")?;

    Ok(())
}
