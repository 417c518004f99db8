// psi-core/src/process.rs
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::Arc;

use psi_common::error::{PsiError, Result};
use tracing::{debug, error};

/// Runs an external command to completion and captures its output.
pub fn run_command_sync<S: AsRef<OsStr>>(
    command: &Path,
    args: &[S],
    cwd: Option<&Path>,
) -> Result<Output> {
    debug!(
        "Running command: {} {:?} (cwd: {:?})",
        command.display(),
        args.iter().map(|a| a.as_ref()).collect::<Vec<_>>(),
        cwd
    );
    let mut cmd = Command::new(command);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(Stdio::null());

    match cmd.output() {
        Ok(output) => {
            if !output.status.success() {
                debug!("Command failed with status: {}", output.status);
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stdout.trim().is_empty() {
                    debug!("Stdout:\n{}", stdout.trim());
                }
                if !stderr.trim().is_empty() {
                    debug!("Stderr:\n{}", stderr.trim());
                }
            } else {
                debug!("Command finished successfully.");
            }
            Ok(output)
        }
        Err(e) => {
            error!("Failed to execute {}: {}", command.display(), e);
            Err(PsiError::Io(Arc::new(e)))
        }
    }
}

/// Trimmed stdout of a successful command, or `None` if it could not be run,
/// exited non-zero, or printed nothing.
pub fn capture_stdout<S: AsRef<OsStr>>(command: &Path, args: &[S]) -> Option<String> {
    match run_command_sync(command, args, None) {
        Ok(output) if output.status.success() => {
            let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        Ok(_) => None,
        Err(e) => {
            debug!("Could not run {}: {}", command.display(), e);
            None
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn captures_trimmed_stdout() {
        let out = capture_stdout(Path::new("sh"), &["-c", "echo '  hello  '"]);
        assert_eq!(out.as_deref(), Some("hello"));
    }

    #[test]
    fn failing_command_yields_none() {
        assert_eq!(capture_stdout(Path::new("sh"), &["-c", "echo nope; exit 3"]), None);
    }

    #[test]
    fn missing_binary_is_an_io_error() {
        let err = run_command_sync(Path::new("/nonexistent/psi-test-binary"), &["--version"], None)
            .unwrap_err();
        assert!(matches!(err, PsiError::Io(_)));
    }
}
