use std::sync::Arc;

use tracing::info;

use crate::{config::AppConfig, server::error::AppResult};

use super::{
    thumbnail_services::ThumbnailService,
    upstream_services::{DynUpstreamService, UpstreamService},
};

/// everything a request handler needs, built once at startup and cloned into each request
#[derive(Clone)]
pub struct ProxyServices {
    pub upstream: DynUpstreamService,
    pub thumbnails: ThumbnailService,
    pub config: Arc<AppConfig>,
}

impl ProxyServices {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        info!("starting proxy services...");

        let upstream = Arc::new(UpstreamService::new(&config)?) as DynUpstreamService;

        info!("upstream client ok");

        Ok(Self::with_upstream(config, upstream))
    }

    /// same wiring with a different upstream, which is how the tests swap in a mock
    pub fn with_upstream(config: Arc<AppConfig>, upstream: DynUpstreamService) -> Self {
        let thumbnails = ThumbnailService::new(upstream.clone());

        Self {
            upstream,
            thumbnails,
            config,
        }
    }
}
