use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use ytproxy::{AppConfig, ApplicationServer, Logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(AppConfig::parse());

    // guards are kept alive to flush logs and keep the sentry client around
    let _guards = Logger::init(config.cargo_env, config.sentry_dsn.clone());

    info!(
        "logger and env prepped (prefix: {:?}, ipv6 disabled: {}, webp disabled: {})...",
        config.prefix_path, config.disable_ipv6, config.disable_webp
    );

    ApplicationServer::serve(config)
        .await
        .context("proxy server failed to start")?;

    Ok(())
}
