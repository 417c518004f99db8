use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::process::capture_stdout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Other(String),
}

impl Platform {
    pub fn current() -> Self {
        Self::from_os(env::consts::OS)
    }

    pub fn from_os(os: &str) -> Self {
        match os {
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            other => Platform::Other(other.to_string()),
        }
    }
}

/// Queries against the host toolchain used while deciding where APR and
/// Subversion live.
pub trait ToolchainProbe {
    /// Installation prefix of a Homebrew package.
    fn brew_prefix(&self, package: &str) -> Option<PathBuf>;

    /// The compiler's target triple, e.g. `x86_64-linux-gnu`.
    fn linux_multiarch(&self) -> Option<String>;

    /// Runs an `apr-1-config`/`apu-1-config` style tool with a single flag.
    fn config_tool_query(&self, tool: &Path, flag: &str) -> Option<String>;
}

/// Probe backed by the real `brew`, `gcc` and config tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl ToolchainProbe for SystemProbe {
    fn brew_prefix(&self, package: &str) -> Option<PathBuf> {
        match capture_stdout(Path::new("brew"), &["--prefix", package]) {
            Some(path) => {
                debug!("{} was found in brew: {}", package, path);
                Some(PathBuf::from(path))
            }
            None => {
                debug!("{} was not found in brew", package);
                None
            }
        }
    }

    fn linux_multiarch(&self) -> Option<String> {
        let arch = capture_stdout(Path::new("gcc"), &["-dumpmachine"]);
        debug!("gcc -dumpmachine: {:?}", arch);
        arch
    }

    fn config_tool_query(&self, tool: &Path, flag: &str) -> Option<String> {
        let value = capture_stdout(tool, &[flag]);
        debug!("{} {} -> {:?}", tool.display(), flag, value);
        value
    }
}

/// Existing multiarch library directories for `triple` under each root.
pub fn multiarch_dirs(triple: &str, roots: &[&Path]) -> Vec<PathBuf> {
    roots
        .iter()
        .map(|root| root.join(triple))
        .filter(|path| path.exists())
        .collect()
}
