use axum::http::StatusCode;
use tracing::{debug, warn};

use crate::server::utils::host_utils::THUMBNAIL_HOST;

use super::upstream_services::DynUpstreamService;

/// what clients ask for when they want "the best one there is"
pub const MAXRES_SUFFIX: &str = "maxres.jpg";

/// best first. the last one exists for every video so it's never probed on its own merit
pub const THUMBNAIL_CANDIDATES: [&str; 4] = [
    "maxresdefault.jpg",
    "sddefault.jpg",
    "hqdefault.jpg",
    "mqdefault.jpg",
];

pub const FALLBACK_THUMBNAIL: &str = "mqdefault.jpg";

#[derive(Clone)]
pub struct ThumbnailService {
    upstream: DynUpstreamService,
}

impl ThumbnailService {
    pub fn new(upstream: DynUpstreamService) -> Self {
        Self { upstream }
    }

    pub fn wants_best(path: &str) -> bool {
        path.ends_with(MAXRES_SUFFIX)
    }

    /// Swaps the `maxres.jpg` at the end of `path` for the best thumbnail upstream actually has.
    ///
    /// Probes run one at a time in quality order, the first 200 wins. Errors and other statuses
    /// just move on to the next candidate, and if nothing answers the mq path comes back anyway.
    pub async fn best_thumbnail(&self, path: &str) -> String {
        let Some(stem) = path.strip_suffix(MAXRES_SUFFIX) else {
            return path.to_string();
        };

        for candidate in THUMBNAIL_CANDIDATES {
            let candidate_path = format!("{}{}", stem, candidate);
            let probe_url = format!("https://{}{}", THUMBNAIL_HOST, candidate_path);

            match self.upstream.head_status(&probe_url).await {
                Ok(StatusCode::OK) => {
                    debug!("Best thumbnail for {} is {}", path, candidate);
                    return candidate_path;
                }
                Ok(status) => debug!("Thumbnail probe {} returned {}", probe_url, status),
                Err(e) => warn!("Thumbnail probe {} failed: {}", probe_url, e),
            }
        }

        debug!("No thumbnail probe succeeded for {}, using {}", path, FALLBACK_THUMBNAIL);
        format!("{}{}", stem, FALLBACK_THUMBNAIL)
    }
}
