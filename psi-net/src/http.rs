use std::time::Duration;

use psi_common::error::{PsiError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;

const DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;
const USER_AGENT_STRING: &str = concat!("pysvn-installer/", env!("CARGO_PKG_VERSION"), " (Rust)");

/// Client shared by the feed lookup and the archive download. SourceForge
/// answers download links with a chain of mirror redirects.
pub fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()
        .map_err(|e| PsiError::HttpError(format!("Failed to build HTTP client: {e}")))
}
