pub mod header_utils;
pub mod host_utils;
pub mod image_utils;
pub mod manifest_utils;
pub mod url_utils;
