use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PsiError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Unable to fetch PySVN downloads RSS feed: {reason} (tried to load feed from {url})")]
    FeedFetch { url: String, reason: String },

    #[error("Unable to find latest PySVN version in RSS feed.")]
    VersionNotFound,

    #[error("Unable to fetch PySVN {0} from '{1}': {2}")]
    DownloadError(String, String, String),

    #[error("Attempted path traversal in archive {archive}: entry '{entry}'")]
    ArchiveTraversal { archive: String, entry: String },

    #[error("Extraction Error: {0}")]
    Extract(String),

    #[error("{0}")]
    MissingContent(String),

    #[error("PySVN's setup.py can no longer be patched: {0}")]
    PatchPrecondition(String),

    #[error("{0}")]
    MissingPrerequisite(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Interrupted")]
    Interrupted,

    #[error("PySVN build exited with status {0}")]
    BuildFailed(i32),

    #[error("Failed to execute command: {0}")]
    CommandExecError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("IoError: {0}")]
    IoError(String),

    #[error("HttpError: {0}")]
    HttpError(String),
}

impl PsiError {
    /// Errors caused by upstream changes to the feed, the archive layout or
    /// `setup.py`, which the installer maintainers need to hear about.
    pub fn is_upstream_change(&self) -> bool {
        matches!(
            self,
            PsiError::VersionNotFound
                | PsiError::DownloadError(..)
                | PsiError::MissingContent(_)
                | PsiError::PatchPrecondition(_)
        )
    }
}

impl From<std::io::Error> for PsiError {
    fn from(err: std::io::Error) -> Self {
        PsiError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for PsiError {
    fn from(err: reqwest::Error) -> Self {
        PsiError::Http(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, PsiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_changes_are_flagged_for_reporting() {
        assert!(PsiError::VersionNotFound.is_upstream_change());
        assert!(PsiError::PatchPrecondition("marker missing".to_string()).is_upstream_change());
        assert!(
            PsiError::MissingContent("Unable to find pysvn-* directory in tarball.".to_string())
                .is_upstream_change()
        );
        assert!(!PsiError::BuildFailed(1).is_upstream_change());
        assert!(!PsiError::Interrupted.is_upstream_change());
        assert!(!PsiError::MissingPrerequisite("no pip".to_string()).is_upstream_change());
    }

    #[test]
    fn io_errors_convert() {
        let err: PsiError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, PsiError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
