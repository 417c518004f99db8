use psi_common::error::{PsiError, Result};
use url::Url;

/// Validates a URL, ensuring it uses the HTTPS scheme.
pub fn validate_url(url_str: &str) -> Result<()> {
    let url = Url::parse(url_str).map_err(|e| {
        PsiError::ValidationError(format!("Failed to parse URL '{url_str}': {e}"))
    })?;
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(PsiError::ValidationError(format!(
            "Invalid URL scheme for '{}': Must be https, but got '{}'",
            url_str,
            url.scheme()
        )))
    }
}
