// psi-core/src/install/python.rs
//! Locating the Python interpreter that will build PySVN and checking that it
//! carries the packaging modules the build needs.
use std::path::{Path, PathBuf};

use psi_common::error::{PsiError, Result};
use tracing::{debug, warn};

use crate::process::run_command_sync;

const VERSION_SNIPPET: &str = "import sys; print('%d.%d' % sys.version_info[:2])";
const DEFAULT_INTERPRETERS: &[&str] = &["python3", "python"];
pub const REQUIRED_MODULES: &[&str] = &["pip", "wheel"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PythonInfo {
    pub path: PathBuf,
    /// `(major, minor)`, when the interpreter reported it.
    pub version: Option<(u32, u32)>,
}

impl PythonInfo {
    pub fn major(&self) -> Option<u32> {
        self.version.map(|(major, _)| major)
    }

    pub fn version_label(&self) -> String {
        match self.version {
            Some((major, minor)) => format!("{major}.{minor}"),
            None => "(unknown version)".to_string(),
        }
    }
}

/// Resolves the interpreter to use: an explicit name or path, or the first of
/// `python3`/`python` on PATH.
pub fn locate_python(requested: Option<&str>) -> Result<PathBuf> {
    if let Some(name) = requested {
        let as_path = Path::new(name);
        if as_path.components().count() > 1 || as_path.is_absolute() {
            return if as_path.is_file() {
                Ok(as_path.to_path_buf())
            } else {
                Err(PsiError::MissingPrerequisite(format!(
                    "Python interpreter {name} does not exist."
                )))
            };
        }
        return which::which(name).map_err(|e| {
            PsiError::MissingPrerequisite(format!(
                "Unable to find Python interpreter '{name}' on PATH: {e}"
            ))
        });
    }

    DEFAULT_INTERPRETERS
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| {
            PsiError::MissingPrerequisite(
                "Unable to find a Python interpreter (python3 or python) on PATH.".to_string(),
            )
        })
}

pub fn parse_version(text: &str) -> Option<(u32, u32)> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let (major, minor) = line.split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// Asks the interpreter for its version.
pub fn inspect_python(path: &Path) -> Result<PythonInfo> {
    let output = run_command_sync(path, &["-c", VERSION_SNIPPET], None).map_err(|e| {
        PsiError::MissingPrerequisite(format!(
            "Unable to run Python interpreter {}: {}",
            path.display(),
            e
        ))
    })?;

    let version = if output.status.success() {
        parse_version(&String::from_utf8_lossy(&output.stdout))
    } else {
        None
    };
    if version.is_none() {
        warn!(
            "Could not determine the version of {}; continuing anyway.",
            path.display()
        );
    }

    let info = PythonInfo {
        path: path.to_path_buf(),
        version,
    };
    debug!("Using Python {} at {}", info.version_label(), path.display());
    Ok(info)
}

/// Fails with an install hint for the first module the interpreter cannot import.
pub fn require_modules(info: &PythonInfo, modules: &[&str]) -> Result<()> {
    for module in modules {
        let statement = format!("import {module}");
        let output = run_command_sync(&info.path, &["-c", statement.as_str()], None)?;
        if !output.status.success() {
            return Err(PsiError::MissingPrerequisite(format!(
                "Install {} for Python {} and try again.",
                module,
                info.version_label()
            )));
        }
        debug!("Python module '{}' is available", module);
    }
    Ok(())
}

/// Locates and checks the interpreter before any download happens.
pub fn preflight(requested: Option<&str>) -> Result<PythonInfo> {
    let path = locate_python(requested)?;
    let info = inspect_python(&path)?;
    require_modules(&info, REQUIRED_MODULES)?;
    Ok(info)
}
