// ===== psi-core/src/build/mod.rs =====
use std::ffi::OsString;
use std::path::Path;

use psi_common::error::{PsiError, Result};
use psi_common::model::BuildMode;
use tokio::process::Command;
use tracing::{debug, error};

pub mod devtools;
pub mod env;
pub mod patch;
pub mod remediation;

use devtools::{Platform, ToolchainProbe};
use env::SearchPaths;
use patch::{find_pycxx_dir, patch_setup_file, resolve_configure_flags, ConfigureFlags};

/// Points `setup.py configure` at the bundled PyCXX and at the dependency
/// locations discovered for this platform.
pub fn prepare_source_tree(
    src_root: &Path,
    platform: &Platform,
    user: Option<&str>,
    probe: &dyn ToolchainProbe,
) -> Result<ConfigureFlags> {
    let pycxx_dir = find_pycxx_dir(src_root)?;
    debug!("Using PyCXX from {}", pycxx_dir.display());
    let paths = SearchPaths::discover(platform, user, probe);
    let flags = resolve_configure_flags(&pycxx_dir, &paths);
    patch_setup_file(src_root, &flags)?;
    Ok(flags)
}

/// Interpreter arguments for the build step.
pub fn build_args(src_root: &Path, mode: &BuildMode) -> Vec<OsString> {
    match mode {
        BuildMode::Install => vec![
            "-m".into(),
            "pip".into(),
            "install".into(),
            src_root.as_os_str().to_owned(),
        ],
        BuildMode::BuildOnly { dist_dir } => vec![
            "setup.py".into(),
            "bdist_wheel".into(),
            "--dist-dir".into(),
            dist_dir.as_os_str().to_owned(),
        ],
    }
}

/// Runs the build inside `src_root` with the terminal attached and returns
/// its exit code.
pub async fn run_build(python: &Path, src_root: &Path, mode: &BuildMode) -> Result<i32> {
    let args = build_args(src_root, mode);
    debug!(
        "Running {} {:?} in {}",
        python.display(),
        args,
        src_root.display()
    );

    let status = Command::new(python)
        .args(&args)
        .current_dir(src_root)
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| {
            error!("Failed to launch {}: {}", python.display(), e);
            PsiError::CommandExecError(format!("{} {:?}: {}", python.display(), args, e))
        })?;

    // Killed by a signal: no code, still a failure.
    let code = status.code().unwrap_or(-1);
    debug!("Exit code = {}", code);
    Ok(code)
}
