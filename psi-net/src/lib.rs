// psi-net/src/lib.rs
pub mod download;
pub mod feed;
pub mod http;
pub mod validation;

pub use download::{download_source_archive, save_response, source_archive_url};
pub use feed::{fetch_latest_version, latest_version_from_response, parse_latest_version};
pub use http::build_http_client;
pub use validation::validate_url;
