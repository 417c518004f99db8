// psi-core/src/build/patch.rs
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use psi_common::error::{PsiError, Result};
use tracing::debug;

use super::env::SearchPaths;
use crate::install::first_dir_matching;

/// The `setup.py` invocation that receives the extra configure flags.
pub const CONFIGURE_MARKER: &str = "setup.py configure";
pub const SETUP_SCRIPT: &str = "setup.py";

const IMPORT_DIR: &str = "Import";
const PYCXX_PREFIX: &str = "pycxx";

/// Flags appended to `setup.py configure`, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigureFlags(Vec<String>);

impl ConfigureFlags {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    fn push_raw(&mut self, flag: impl Into<String>) {
        self.0.push(flag.into());
    }

    fn push_dir(&mut self, name: &str, dir: &Path) {
        self.0.push(format!("--{}=\"{}\"", name, dir.display()));
    }

    /// Value of `--<name>=` without its quotes, if present.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        let prefix = format!("--{name}=");
        self.0
            .iter()
            .find_map(|flag| flag.strip_prefix(prefix.as_str()))
            .map(|value| value.trim_matches('"'))
    }
}

impl fmt::Display for ConfigureFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

/// Locates the PyCXX copy bundled under `Import/` in the source tree.
pub fn find_pycxx_dir(src_root: &Path) -> Result<PathBuf> {
    first_dir_matching(&src_root.join(IMPORT_DIR), PYCXX_PREFIX)?.ok_or_else(|| {
        PsiError::MissingContent(
            "PySVN seems to be missing an Import/pycxx* directory".to_string(),
        )
    })
}

fn first_containing<'a>(candidates: &'a [PathBuf], filename: &str) -> Option<&'a Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|dir| dir.join(filename).exists())
}

/// Builds the configure flags: the bundled PyCXX, platform extras, then the
/// first candidate directory of each kind that holds its marker file.
pub fn resolve_configure_flags(pycxx_dir: &Path, paths: &SearchPaths) -> ConfigureFlags {
    let mut flags = ConfigureFlags::default();
    flags.push_dir("pycxx-dir", pycxx_dir);
    for extra in &paths.extra_flags {
        flags.push_raw(extra.clone());
    }

    if let Some(dir) = first_containing(&paths.apr_include, "apr.h") {
        flags.push_dir("apr-inc-dir", dir);
    }
    if let Some(libapr) = paths.libapr_filename {
        if let Some(dir) = first_containing(&paths.apr_lib, libapr) {
            flags.push_dir("apr-lib-dir", dir);
        }
    }
    if let Some(dir) = first_containing(&paths.apu_include, "apu.h") {
        flags.push_dir("apu-inc-dir", dir);
    }
    if let Some(dir) = first_containing(&paths.svn_bin, "svn") {
        flags.push_dir("svn-bin-dir", dir);
    }
    if let Some(dir) = first_containing(&paths.svn_include, "svn_client.h") {
        flags.push_dir("svn-inc-dir", dir);
    }
    if let Some(libsvn) = paths.libsvn_client_filename {
        if let Some(dir) = first_containing(&paths.svn_lib, libsvn) {
            flags.push_dir("svn-lib-dir", dir);
        }
    }

    debug!("Using configuration arguments: {:?}", flags.as_slice());
    flags
}

/// Appends `flags` to every `setup.py configure` invocation in `script`.
pub fn patch_setup_script(script: &str, flags: &ConfigureFlags) -> Result<String> {
    if !script.contains(CONFIGURE_MARKER) {
        return Err(PsiError::PatchPrecondition(format!(
            "'{CONFIGURE_MARKER}' was not found"
        )));
    }
    Ok(script.replace(CONFIGURE_MARKER, &format!("{CONFIGURE_MARKER} {flags}")))
}

/// Rewrites `<src_root>/setup.py` in place.
pub fn patch_setup_file(src_root: &Path, flags: &ConfigureFlags) -> Result<PathBuf> {
    let setup_path = src_root.join(SETUP_SCRIPT);
    let script = fs::read_to_string(&setup_path).map_err(|e| {
        PsiError::IoError(format!("Failed to read {}: {}", setup_path.display(), e))
    })?;
    let patched = patch_setup_script(&script, flags)?;
    fs::write(&setup_path, patched).map_err(|e| {
        PsiError::IoError(format!("Failed to write {}: {}", setup_path.display(), e))
    })?;
    debug!("Patched {}", setup_path.display());
    Ok(setup_path)
}
