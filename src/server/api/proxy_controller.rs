// the whole proxy is this one handler, every path lands here
use axum::{
    Extension, Router,
    body::{Body, to_bytes},
    http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};
use url::Url;

use crate::{
    config::AppConfig,
    server::{
        error::{AppResult, Error},
        services::{
            ProxyServices, ThumbnailService,
            upstream_services::{USER_AGENT, UpstreamResponse},
        },
        utils::{
            header_utils::{CopyOptions, copy_headers},
            host_utils::{is_allowed_host, registrable_domain, resolve_host},
            image_utils::{WEBP_CONTENT_TYPE, is_jpeg_content_type, jpeg_to_webp},
            manifest_utils::{is_manifest_content_type, rewrite_manifest},
        },
    },
};

/// where a request is headed once the routing params are pulled out of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub host: String,
    pub path: String,
    /// everything from the inbound query except `host`, in the order it came in
    pub query: Vec<(String, String)>,
}

impl ResolvedTarget {
    /// Picks the upstream host out of the query or path and checks it against the allowlist.
    ///
    /// Nothing here touches the network, a rejected request never makes it upstream.
    pub fn resolve(method: &Method, uri: &Uri) -> AppResult<Self> {
        let pairs: Vec<(String, String)> =
            url::form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
                .into_owned()
                .collect();

        let param = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };

        let host = resolve_host(param("host"), param("hls_chunk_host"), uri.path())
            .ok_or_else(|| Error::BadRequest("No host in query parameters.".to_string()))?;

        if registrable_domain(&host).is_none() {
            return Err(Error::BadRequest("Invalid hostname.".to_string()));
        }

        if !is_allowed_host(&host) {
            return Err(Error::Forbidden(
                "Non YouTube domains are not supported.".to_string(),
            ));
        }

        if method != Method::GET && method != Method::HEAD {
            return Err(Error::MethodNotAllowed(
                "Only GET and HEAD requests are allowed.".to_string(),
            ));
        }

        // avatars come in as /ggpht/..., storyboards as /sb/i/...
        let path = uri.path().replacen("/ggpht", "", 1).replacen("/i/", "/", 1);

        let query = pairs.into_iter().filter(|(key, _)| key != "host").collect();

        Ok(Self { host, path, query })
    }

    pub fn upstream_url(&self) -> AppResult<Url> {
        let mut url = Url::parse(&format!("https://{}{}", self.host, self.path)).map_err(|e| {
            error!("Failed to build upstream url for {}: {}", self.host, e);
            Error::BadGateway(format!("invalid upstream url: {}", e))
        })?;

        // a host like "evil.com?.youtube.com" passes the label check but parses to evil.com
        if url.host_str() != Some(self.host.to_lowercase().as_str()) {
            return Err(Error::BadRequest("Invalid hostname.".to_string()));
        }

        url.set_query(None);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        Ok(url)
    }
}

pub struct ProxyController;

impl ProxyController {
    pub fn app() -> Router {
        Router::new().fallback(Self::proxy)
    }

    async fn proxy(
        Extension(services): Extension<ProxyServices>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        // preflights never go upstream, the cors layer does the rest
        if method == Method::OPTIONS {
            metrics::counter!("ytproxy_requests_total", "outcome" => "options").increment(1);
            return Ok(StatusCode::OK.into_response());
        }

        let target = ResolvedTarget::resolve(&method, &uri).inspect_err(|e| {
            debug!("Rejected {} {}: {}", method, uri, e);
            metrics::counter!("ytproxy_requests_total", "outcome" => "rejected").increment(1);
        })?;

        let mut url = target.upstream_url()?;

        if ThumbnailService::wants_best(url.path()) {
            let best = services.thumbnails.best_thumbnail(url.path()).await;
            url.set_path(&best);
        }

        let mut upstream_headers = HeaderMap::new();
        copy_headers(&headers, &mut upstream_headers, CopyOptions::default());
        upstream_headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

        debug!("Proxying {} {} -> {}", method, uri, url);

        let upstream = services
            .upstream
            .fetch(method.clone(), url, upstream_headers)
            .await?;

        Self::respond(&method, upstream, &services.config).await
    }

    async fn respond(
        method: &Method,
        upstream: UpstreamResponse,
        config: &AppConfig,
    ) -> AppResult<Response> {
        let content_type = upstream.content_type().to_string();

        if method == Method::GET && is_manifest_content_type(&content_type) {
            Self::rewrite_manifest_response(upstream, config).await
        } else if !config.disable_webp && is_jpeg_content_type(&content_type) {
            Self::transcode_response(method, upstream).await
        } else {
            Ok(Self::passthrough_response(upstream))
        }
    }

    async fn read_body(upstream: UpstreamResponse) -> AppResult<axum::body::Bytes> {
        to_bytes(upstream.body, usize::MAX).await.map_err(|e| {
            error!("Failed to read response: {}", e);
            Error::BadGateway(format!("failed to read response: {}", e))
        })
    }

    async fn rewrite_manifest_response(
        upstream: UpstreamResponse,
        config: &AppConfig,
    ) -> AppResult<Response> {
        let status = upstream.status;
        let final_url = upstream.url.clone();

        // body length changes, so Content-Length stays behind
        let mut headers = HeaderMap::new();
        copy_headers(&upstream.headers, &mut headers, CopyOptions::default());

        let bytes = Self::read_body(upstream).await?;
        let text = String::from_utf8_lossy(&bytes);
        let rewritten = rewrite_manifest(&text, &final_url, &config.prefix_path)?;

        debug!(
            "Rewrote manifest {} from {} to {} bytes",
            final_url,
            bytes.len(),
            rewritten.len()
        );
        metrics::counter!("ytproxy_requests_total", "outcome" => "manifest").increment(1);

        Ok((status, headers, Body::from(rewritten)).into_response())
    }

    async fn transcode_response(method: &Method, upstream: UpstreamResponse) -> AppResult<Response> {
        let status = upstream.status;

        let mut headers = HeaderMap::new();
        copy_headers(
            &upstream.headers,
            &mut headers,
            CopyOptions {
                preserve_length: false,
                strip_jpeg_content_type: true,
            },
        );
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(WEBP_CONTENT_TYPE),
        );

        // nothing to decode, but the client should still learn what a GET would give it
        if method == Method::HEAD {
            return Ok((status, headers).into_response());
        }

        let jpeg = Self::read_body(upstream).await?;

        let webp = tokio::task::spawn_blocking(move || jpeg_to_webp(&jpeg))
            .await
            .map_err(|e| {
                error!("Transcode task failed: {}", e);
                Error::InternalServerErrorWithContext(format!("transcode task failed: {}", e))
            })??;

        metrics::counter!("ytproxy_requests_total", "outcome" => "transcoded").increment(1);

        Ok((status, headers, Body::from(webp)).into_response())
    }

    fn passthrough_response(upstream: UpstreamResponse) -> Response {
        let mut headers = HeaderMap::new();
        copy_headers(
            &upstream.headers,
            &mut headers,
            CopyOptions {
                preserve_length: true,
                strip_jpeg_content_type: false,
            },
        );

        metrics::counter!("ytproxy_requests_total", "outcome" => "passthrough").increment(1);

        (upstream.status, headers, upstream.body).into_response()
    }
}
