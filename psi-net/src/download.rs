// psi-net/src/download.rs
use std::fs;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use psi_common::error::{PsiError, Result};
use reqwest::{Client, Response, StatusCode};
use tokio::fs::File as TokioFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

use crate::validation::validate_url;

/// Expands the `{version}` placeholders of a download URL template.
pub fn source_archive_url(template: &str, version: &str) -> String {
    template.replace("{version}", version)
}

/// Downloads the source archive for `version` to `final_path`.
pub async fn download_source_archive(
    client: &Client,
    version: &str,
    url: &str,
    final_path: &Path,
) -> Result<PathBuf> {
    validate_url(url)?;
    debug!("PySVN URL: {}", url);

    let response = client.get(url).send().await.map_err(|e| {
        debug!("HTTP request failed for {url}: {e}");
        PsiError::DownloadError(
            version.to_string(),
            url.to_string(),
            format!("HTTP request failed: {e}"),
        )
    })?;
    save_response(response, version, url, final_path).await
}

/// Streams a download response into place at `final_path`.
///
/// The body goes into a sibling `.download` file which is renamed into place
/// only once the transfer completed.
pub async fn save_response(
    response: Response,
    version: &str,
    url: &str,
    final_path: &Path,
) -> Result<PathBuf> {
    let download_error =
        |reason: String| PsiError::DownloadError(version.to_string(), url.to_string(), reason);

    let status = response.status();
    debug!("Received HTTP status: {} for {}", status, url);
    if !status.is_success() {
        error!("HTTP error {} for URL {}", status, url);
        return Err(match status {
            StatusCode::NOT_FOUND => download_error("Release not found (404)".to_string()),
            StatusCode::FORBIDDEN => download_error("Access forbidden (403)".to_string()),
            _ => download_error(format!("HTTP error {status}")),
        });
    }

    let temp_path = partial_path(final_path);
    debug!("Downloading to temporary path: {}", temp_path.display());
    if temp_path.exists() {
        if let Err(e) = fs::remove_file(&temp_path) {
            warn!(
                "Could not remove existing temporary file {}: {}",
                temp_path.display(),
                e
            );
        }
    }

    let mut temp_file = TokioFile::create(&temp_path).await.map_err(|e| {
        PsiError::IoError(format!(
            "Failed to create temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;

    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path);
                return Err(download_error(format!("Failed to read response body: {e}")));
            }
        };
        temp_file.write_all(&chunk).await.map_err(|e| {
            PsiError::IoError(format!(
                "Failed to write download stream to {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        written += chunk.len() as u64;
    }
    temp_file.flush().await?;
    drop(temp_file);
    debug!("Finished writing {} bytes to temp file.", written);

    fs::rename(&temp_path, final_path).map_err(|e| {
        PsiError::IoError(format!(
            "Failed to move temp file {} to {}: {}",
            temp_path.display(),
            final_path.display(),
            e
        ))
    })?;
    debug!("Moved download to final location: {}", final_path.display());
    Ok(final_path.to_path_buf())
}

fn partial_path(final_path: &Path) -> PathBuf {
    let temp_filename = format!(
        ".{}.download",
        final_path.file_name().unwrap_or_default().to_string_lossy()
    );
    final_path.with_file_name(temp_filename)
}
