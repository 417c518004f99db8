// psi-core/src/install/mod.rs
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use psi_common::error::{PsiError, Result};
use tracing::debug;

pub mod extract;
pub mod python;

pub use extract::{extract_archive, find_source_root};

/// First directory (in sorted order) directly under `parent` whose name starts
/// with `prefix`.
pub(crate) fn first_dir_matching(parent: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    let pattern = format!(
        "{}{}{}*",
        glob::Pattern::escape(&parent.to_string_lossy()),
        MAIN_SEPARATOR,
        glob::Pattern::escape(prefix)
    );
    debug!("Searching for directories matching {}", pattern);

    let mut matches: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| PsiError::ValidationError(format!("Invalid search pattern '{pattern}': {e}")))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_dir())
        .collect();
    matches.sort();
    Ok(matches.into_iter().next())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn picks_sorted_first_directory_and_ignores_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pycxx-0.0.0"), "not a dir").unwrap();
        fs::create_dir(dir.path().join("pycxx-7.1.4")).unwrap();
        fs::create_dir(dir.path().join("pycxx-6.2.8")).unwrap();

        assert_eq!(
            first_dir_matching(dir.path(), "pycxx").unwrap(),
            Some(dir.path().join("pycxx-6.2.8"))
        );
    }

    #[test]
    fn glob_metacharacters_in_parent_are_literal() {
        let dir = tempfile::tempdir().unwrap();
        let odd = dir.path().join("build[1]");
        fs::create_dir_all(odd.join("pysvn-1.9.12")).unwrap();

        assert_eq!(
            first_dir_matching(&odd, "pysvn-").unwrap(),
            Some(odd.join("pysvn-1.9.12"))
        );
    }

    #[test]
    fn no_match_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(first_dir_matching(dir.path(), "pysvn-").unwrap(), None);
    }
}
