/// registrable domains (last two labels) we're willing to relay for
pub const ALLOWED_DOMAINS: [&str; 7] = [
    "youtube.com",
    "googlevideo.com",
    "ytimg.com",
    "ggpht.com",
    "googleusercontent.com",
    "lbryplayer.xyz",
    "odycdn.com",
];

pub const THUMBNAIL_HOST: &str = "i.ytimg.com";
pub const AVATAR_HOST: &str = "yt3.ggpht.com";

/// Works out which upstream a request is meant for.
///
/// An explicit `host` parameter wins, then youtube's `hls_chunk_host`, then whatever the path
/// shape implies. Returns `None` when nothing points anywhere.
pub fn resolve_host(host: Option<&str>, hls_chunk_host: Option<&str>, path: &str) -> Option<String> {
    host.filter(|h| !h.is_empty())
        .or(hls_chunk_host.filter(|h| !h.is_empty()))
        .map(str::to_string)
        .or_else(|| host_from_path(path))
}

/// thumbnails and avatars come in without any host param, so we guess from the path
pub fn host_from_path(path: &str) -> Option<String> {
    // /host/<h>/ is the most specific so it's checked first
    if let Some(host) = embedded_host(path) {
        return Some(host.to_string());
    }

    if ["/vi/", "/vi_webp/", "/sb/"]
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        return Some(THUMBNAIL_HOST.to_string());
    }

    if ["/ggpht/", "/a/", "/ytc/"]
        .iter()
        .any(|prefix| path.starts_with(prefix))
    {
        return Some(AVATAR_HOST.to_string());
    }

    None
}

// the segment between /host/ and the next slash, needs that trailing slash to count
fn embedded_host(path: &str) -> Option<&str> {
    let start = path.find("/host/")? + "/host/".len();
    let rest = &path[start..];
    let end = rest.find('/')?;

    Some(&rest[..end]).filter(|h| !h.is_empty())
}

/// last two dot separated labels, lower cased. `None` for single label hosts
pub fn registrable_domain(host: &str) -> Option<String> {
    let host = host.to_lowercase();
    let mut labels = host.rsplit('.');

    let tld = labels.next()?;
    let name = labels.next()?;

    Some(format!("{}.{}", name, tld))
}

pub fn is_allowed_domain(domain: &str) -> bool {
    ALLOWED_DOMAINS.contains(&domain)
}

/// full gate check, fails closed on anything that doesn't reduce to an allowed domain
pub fn is_allowed_host(host: &str) -> bool {
    registrable_domain(host).is_some_and(|domain| is_allowed_domain(&domain))
}
