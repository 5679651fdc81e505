pub mod proxy_services;
pub mod thumbnail_services;
pub mod upstream_services;

pub use proxy_services::ProxyServices;
pub use thumbnail_services::ThumbnailService;
pub use upstream_services::DynUpstreamService;
