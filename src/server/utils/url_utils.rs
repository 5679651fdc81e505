use tracing::error;
use url::{Position, Url};

use crate::server::error::{AppResult, Error};

/// Turns an absolute upstream url into a path on this proxy.
///
/// The upstream host moves into a `host` query param (replacing any `host` already there, so a
/// url is never rewritten into two of them) and the path gets `prefix` in front. Scheme and
/// authority are dropped. Input that is already relative is returned as is, so running this
/// over its own output is a no-op.
pub fn relative_url(input: &str, prefix: &str) -> AppResult<String> {
    let mut url = match Url::parse(input) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => return Ok(input.to_string()),
        Err(e) => {
            error!("Failed to parse embedded url {}: {}", input, e);
            return Err(Error::BadGateway(format!("invalid url {}: {}", input, e)));
        }
    };

    let host = url
        .host_str()
        .ok_or_else(|| Error::BadGateway(format!("url has no host: {}", input)))?
        .to_string();

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "host")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("host", &host);

    let path = format!("{}{}", prefix, url.path());
    url.set_path(&path);

    Ok(url[Position::BeforePath..Position::AfterQuery].to_string())
}
