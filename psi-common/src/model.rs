// psi-common/src/model.rs
use std::path::PathBuf;

/// Releases published upstream that fail to build, paired with the release to
/// install instead. Only applied to versions discovered from the feed.
pub const KNOWN_BAD_RELEASES: &[(&str, &str)] = &[("1.9.13", "1.9.12")];

/// Where the source archive comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A tarball already on disk; no network access happens.
    Local(PathBuf),
    /// Downloaded from upstream. `None` means "latest from the feed".
    Remote { version: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildMode {
    /// `pip install` the patched source tree into the interpreter's environment.
    Install,
    /// Build a wheel into `dist_dir` without installing it.
    BuildOnly { dist_dir: PathBuf },
}

impl BuildMode {
    pub fn is_build_only(&self) -> bool {
        matches!(self, BuildMode::BuildOnly { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub source: Source,
    pub mode: BuildMode,
}

/// Maps a feed-discovered version onto a known-good replacement.
pub fn remap_known_bad_release(version: &str) -> &str {
    KNOWN_BAD_RELEASES
        .iter()
        .find(|(bad, _)| *bad == version)
        .map_or(version, |&(_, good)| good)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_release_is_swapped() {
        assert_eq!(remap_known_bad_release("1.9.13"), "1.9.12");
    }

    #[test]
    fn other_releases_pass_through() {
        assert_eq!(remap_known_bad_release("1.9.12"), "1.9.12");
        assert_eq!(remap_known_bad_release("1.10.0"), "1.10.0");
    }
}
