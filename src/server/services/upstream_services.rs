use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Method, StatusCode, header},
};
use mockall::automock;
use tracing::{debug, error, info};
use url::Url;

use crate::{
    config::AppConfig,
    server::error::{AppResult, Error},
};

/// every upstream request goes out looking like this browser
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; rv:78.0) Gecko/20100101";

pub type DynUpstreamService = Arc<dyn UpstreamServiceTrait + Send + Sync>;

/// what came back from upstream, body not read yet
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// where the response actually came from, after redirects
    pub url: Url,
    pub body: Body,
}

impl UpstreamResponse {
    pub fn content_type(&self) -> &str {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

#[automock]
#[async_trait]
pub trait UpstreamServiceTrait {
    /// sends the request as given and hands back the response with its body still streaming
    async fn fetch(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
    ) -> AppResult<UpstreamResponse>;

    /// HEAD request that only cares about the status
    async fn head_status(&self, url: &str) -> AppResult<StatusCode>;
}

pub struct UpstreamService {
    http: reqwest::Client,
}

impl UpstreamService {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .read_timeout(Duration::from_secs(20))
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .http2_adaptive_window(true)
            .user_agent(USER_AGENT);

        // with only a v4 local address set the connector drops v6 addresses from dns results
        if config.disable_ipv6 {
            info!("ipv6 disabled, upstream connections are ipv4 only");
            builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        }

        let http = builder.build().map_err(|e| {
            error!("Failed to build upstream client: {}", e);
            Error::InternalServerErrorWithContext(format!("failed to build http client: {}", e))
        })?;

        Ok(Self { http })
    }
}

#[async_trait]
impl UpstreamServiceTrait for UpstreamService {
    async fn fetch(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
    ) -> AppResult<UpstreamResponse> {
        debug!("Sending {} to {}", method, url);

        let response = self
            .http
            .request(method, url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                error!("Request failed: {}", e);
                Error::BadGateway(format!("request failed: {}", e))
            })?;

        debug!(
            "Received response with status: {} from {}",
            response.status(),
            response.url()
        );

        Ok(UpstreamResponse {
            status: response.status(),
            headers: response.headers().clone(),
            url: response.url().clone(),
            body: Body::from_stream(response.bytes_stream()),
        })
    }

    async fn head_status(&self, url: &str) -> AppResult<StatusCode> {
        let response = self
            .http
            .head(url)
            .send()
            .await
            .map_err(|e| Error::BadGateway(format!("HEAD {} failed: {}", url, e)))?;

        Ok(response.status())
    }
}
