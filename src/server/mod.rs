pub mod api;
pub mod error;
pub mod services;
pub mod utils;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Extension, Router,
    http::{HeaderName, HeaderValue, header},
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::AppConfig;

use api::ProxyController;
use services::ProxyServices;

/// sent on every response, errors and preflights included
pub const CORS_HEADERS: [(HeaderName, &str); 3] = [
    (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
    (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
    (header::ACCESS_CONTROL_MAX_AGE, "1728000"),
];

// long enough for a full video to go through one request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60 * 60);

pub struct ApplicationServer;

impl ApplicationServer {
    /// the full app with all its layers, split from `serve` so tests can drive it directly
    pub fn router(services: ProxyServices) -> Router {
        let mut router = ProxyController::app()
            .layer(CatchPanicLayer::new())
            .layer(Extension(services))
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(TraceLayer::new_for_http());

        for (name, value) in CORS_HEADERS {
            router = router.layer(SetResponseHeaderLayer::overriding(
                name,
                HeaderValue::from_static(value),
            ));
        }

        router
    }

    pub async fn serve(config: Arc<AppConfig>) -> anyhow::Result<()> {
        if let Some(port) = config.metrics_port {
            PrometheusBuilder::new()
                .with_http_listener(([0, 0, 0, 0], port))
                .install()
                .context("failed to start prometheus exporter")?;
            info!("prometheus exporter listening on port {}", port);
        }

        let services =
            ProxyServices::new(config.clone()).context("failed to start proxy services")?;
        let router = Self::router(services);

        // unix socket first, it's what the reverse proxy in front of us expects
        #[cfg(unix)]
        {
            let socket = Path::new(&config.socket_path);

            if socket.exists() {
                if let Err(e) = std::fs::remove_file(socket) {
                    warn!("Failed to remove stale socket {}: {}", socket.display(), e);
                }
            }

            match tokio::net::UnixListener::bind(socket) {
                Ok(listener) => {
                    info!("listening on unix socket {}", socket.display());
                    return axum::serve(listener, router)
                        .await
                        .context("unix socket server failed");
                }
                Err(e) => warn!(
                    "Failed to bind to UDS {}, falling back to TCP/IP: {}",
                    socket.display(),
                    e
                ),
            }
        }

        let listener = TcpListener::bind(("0.0.0.0", config.port))
            .await
            .with_context(|| format!("failed to bind tcp port {}", config.port))?;

        info!("listening on {}", listener.local_addr()?);

        axum::serve(listener, router)
            .await
            .context("tcp server failed")
    }
}
