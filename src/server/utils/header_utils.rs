use axum::http::{HeaderMap, HeaderName, header};

/// never copied in either direction. HeaderName is always lower case so these are too
pub const STRIP_HEADERS: [&str; 7] = [
    "accept-encoding",
    "authorization",
    "origin",
    "referer",
    "cookie",
    "set-cookie",
    "etag",
];

/// connection scoped, meaningless (or outright harmful over h2) on the other leg
pub const HOP_BY_HOP_HEADERS: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
    "te",
    "host",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct CopyOptions {
    /// keep Content-Length, only safe when the body goes out untouched
    pub preserve_length: bool,
    /// drop a jpeg Content-Type, set when the body is about to become a webp
    pub strip_jpeg_content_type: bool,
}

pub fn should_copy(name: &HeaderName, value: &str, options: CopyOptions) -> bool {
    let name_str = name.as_str();

    if STRIP_HEADERS.contains(&name_str) || HOP_BY_HOP_HEADERS.contains(&name_str) {
        return false;
    }

    // cors is set by us on every response, upstream's values would fight with it
    if name_str.starts_with("access-control") {
        return false;
    }

    if name == header::CONTENT_LENGTH && !options.preserve_length {
        return false;
    }

    !(options.strip_jpeg_content_type && name == header::CONTENT_TYPE && value.contains("jpeg"))
}

/// Copies every header from `from` into `to` that survives [`should_copy`].
///
/// Repeated names collapse to the last value, same as setting them one after another.
pub fn copy_headers(from: &HeaderMap, to: &mut HeaderMap, options: CopyOptions) {
    for (name, value) in from {
        // non utf8 values can't contain "jpeg" anyway, empty string keeps them in the running
        let value_str = value.to_str().unwrap_or_default();

        if should_copy(name, value_str, options) {
            to.insert(name.clone(), value.clone());
        }
    }
}
