use image::{DynamicImage, ImageFormat};
use tracing::{debug, error};

use crate::server::error::{AppResult, Error};

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";
pub const WEBP_CONTENT_TYPE: &str = "image/webp";
pub const WEBP_QUALITY: f32 = 85.0;

/// Decodes a jpeg and re-encodes it as a lossy webp at [`WEBP_QUALITY`].
///
/// This is cpu bound, callers on the async runtime should run it through `spawn_blocking`.
pub fn jpeg_to_webp(jpeg: &[u8]) -> AppResult<Vec<u8>> {
    let decoded = image::load_from_memory_with_format(jpeg, ImageFormat::Jpeg).map_err(|e| {
        error!("Failed to decode jpeg: {}", e);
        Error::InternalServerErrorWithContext(format!("failed to decode jpeg: {}", e))
    })?;

    // libwebp only takes rgb(a), grayscale jpegs have to be widened first
    let rgb = match decoded {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageRgba8(_) => decoded,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    };

    let encoder = webp::Encoder::from_image(&rgb).map_err(|e| {
        error!("Failed to prepare webp encoder: {}", e);
        Error::InternalServerErrorWithContext(format!("failed to encode webp: {}", e))
    })?;
    let encoded = encoder
        .encode_simple(false, WEBP_QUALITY)
        .map_err(|e| {
            error!("Failed to encode webp: {:?}", e);
            Error::InternalServerErrorWithContext(format!("failed to encode webp: {:?}", e))
        })?
        .to_vec();

    debug!(
        "Transcoded jpeg from {} to {} bytes of webp",
        jpeg.len(),
        encoded.len()
    );

    Ok(encoded)
}

pub fn is_jpeg_content_type(content_type: &str) -> bool {
    content_type == JPEG_CONTENT_TYPE
}
