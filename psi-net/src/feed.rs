// psi-net/src/feed.rs
use lazy_static::lazy_static;
use psi_common::error::{PsiError, Result};
use regex::bytes::Regex;
use reqwest::{Client, Response};
use tracing::debug;

use crate::validation::validate_url;

lazy_static! {
    static ref VERSION_RE: Regex =
        Regex::new(r"(?-u)<link>.*/files/pysvn/V(?P<version>[0-9\.-]+)/.*</link>").unwrap();
}

/// Returns the version from the first release link in an RSS feed body.
pub fn parse_latest_version(body: &[u8]) -> Option<String> {
    VERSION_RE
        .captures(body)
        .and_then(|caps| caps.name("version"))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
}

/// Fetches the release feed and extracts the newest published version.
pub async fn fetch_latest_version(client: &Client, feed_url: &str) -> Result<String> {
    validate_url(feed_url)?;
    debug!("Fetching release feed from {}", feed_url);

    let feed_error = |reason: String| PsiError::FeedFetch {
        url: feed_url.to_string(),
        reason,
    };

    let response = client
        .get(feed_url)
        .send()
        .await
        .map_err(|e| feed_error(e.to_string()))?;
    latest_version_from_response(response, feed_url).await
}

/// Checks the feed response status and scans its body for the newest release.
pub async fn latest_version_from_response(response: Response, feed_url: &str) -> Result<String> {
    let feed_error = |reason: String| PsiError::FeedFetch {
        url: feed_url.to_string(),
        reason,
    };

    let status = response.status();
    debug!("Received HTTP status: {} for {}", status, feed_url);
    if !status.is_success() {
        return Err(feed_error(format!("HTTP error {status}")));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| feed_error(format!("Failed to read response body: {e}")))?;

    let version = parse_latest_version(&body).ok_or(PsiError::VersionNotFound)?;
    debug!("Latest PySVN version in feed: {}", version);
    Ok(version)
}
