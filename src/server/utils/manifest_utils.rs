use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error};
use url::Url;

use crate::server::{
    error::{AppResult, Error},
    utils::url_utils::relative_url,
};

static URI_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"URI="([^"]+)""#).expect("URI attribute pattern should compile")
});

pub const MANIFEST_CONTENT_TYPES: [&str; 2] =
    ["application/x-mpegurl", "application/vnd.apple.mpegurl"];

/// one playlist line, sorted out before anything touches it
#[derive(Debug, PartialEq, Eq)]
pub enum ManifestLine<'a> {
    /// a uri line that already points somewhere absolute
    AbsoluteReference(&'a str),
    /// segment or sub playlist relative to the playlist itself
    RelativeReference(&'a str),
    /// a tag carrying a quoted URI="..." attribute, the str is the quoted value
    UriAttribute(&'a str),
    /// blank lines, comments, tags without uris, and uri lines we leave alone
    Other,
}

impl<'a> ManifestLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        if line.starts_with('#') {
            return match URI_ATTRIBUTE.captures(line).and_then(|c| c.get(1)) {
                Some(uri) => Self::UriAttribute(uri.as_str()),
                None => Self::Other,
            };
        }

        if line.starts_with("https://") {
            Self::AbsoluteReference(line)
        } else if line.ends_with(".m3u8") || line.ends_with(".ts") {
            Self::RelativeReference(line)
        } else {
            Self::Other
        }
    }
}

/// `https://host/dir/` for the url the playlist was actually served from
pub fn manifest_base(final_url: &Url) -> AppResult<String> {
    let host = final_url
        .host_str()
        .ok_or_else(|| Error::BadGateway(format!("manifest url has no host: {}", final_url)))?;
    let path = final_url.path();
    let dir = &path[..path.rfind('/').map_or(0, |i| i + 1)];

    Ok(format!("https://{}{}", host, dir))
}

fn resolve(base: &str, reference: &str) -> AppResult<Url> {
    Url::parse(base)
        .and_then(|base| base.join(reference))
        .map_err(|e| {
            error!("Failed to resolve: {} - {}", reference, e);
            Error::BadGateway(format!("unresolvable manifest reference {}: {}", reference, e))
        })
}

fn is_fetchable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}

/// Rewrites a single line, leaving anything that isn't a reference untouched.
pub fn rewrite_line(line: &str, base: &str, prefix: &str) -> AppResult<String> {
    match ManifestLine::classify(line) {
        ManifestLine::AbsoluteReference(url) => relative_url(url, prefix),
        ManifestLine::RelativeReference(reference) => {
            relative_url(resolve(base, reference)?.as_str(), prefix)
        }
        ManifestLine::UriAttribute(uri) => {
            let resolved = resolve(base, uri)?;

            // data: keys and skd:// style key schemes aren't fetched through us
            if !is_fetchable(&resolved) {
                debug!("Leaving non-http uri attribute alone: {}", uri);
                return Ok(line.to_string());
            }

            let rewritten = relative_url(resolved.as_str(), prefix)?;
            Ok(line.replacen(&format!("URI=\"{}\"", uri), &format!("URI=\"{}\"", rewritten), 1))
        }
        ManifestLine::Other => Ok(line.to_string()),
    }
}

/// Rewrites every reference in an hls playlist so it routes back through this proxy.
///
/// `final_url` is where the playlist came from after redirects, relative references are
/// resolved against its directory. Line endings (including `\r\n`) are kept as they were.
pub fn rewrite_manifest(body: &str, final_url: &Url, prefix: &str) -> AppResult<String> {
    let base = manifest_base(final_url)?;
    debug!("Rewriting manifest from {} against base {}", final_url, base);

    let lines = body
        .split('\n')
        .map(|raw| {
            let (line, cr) = match raw.strip_suffix('\r') {
                Some(line) => (line, "\r"),
                None => (raw, ""),
            };

            rewrite_line(line, &base, prefix)
                .map(|rewritten| format!("{}{}", rewritten, cr))
                .inspect_err(|e| error!("Failed to rewrite manifest line {}: {}", line, e))
        })
        .collect::<AppResult<Vec<String>>>()?;

    Ok(lines.join("\n"))
}

/// media type only, parameters like charset are ignored
pub fn is_manifest_content_type(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or("").trim();

    MANIFEST_CONTENT_TYPES
        .iter()
        .any(|t| media_type.eq_ignore_ascii_case(t))
}
