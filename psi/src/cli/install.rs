// psi/src/cli/install.rs
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::builder::FalseyValueParser;
use clap::{ArgAction, Args};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use psi_common::config::Config;
use psi_common::error::{PsiError, Result};
use psi_common::model::{remap_known_bad_release, BuildMode, InstallRequest, Source};
use psi_core::build::devtools::{Platform, SystemProbe};
use psi_core::build::remediation::remediation_hint;
use psi_core::build::{prepare_source_tree, run_build};
use psi_core::install::python::{self, PythonInfo};
use psi_core::install::{extract_archive, find_source_root};
use psi_net::{build_http_client, download_source_archive, fetch_latest_version, source_archive_url};
use tracing::{debug, instrument, warn};

const TEMP_DIR_SUFFIX: &str = ".pysvn-install";
const ARCHIVE_FILENAME: &str = "pysvn.tar.gz";

#[derive(Debug, Args)]
pub struct InstallArgs {
    #[arg(
        long = "pysvn-version",
        value_name = "VERSION",
        env = "PYSVN_INSTALLER_VERSION",
        help = "A specific version of PySVN to install."
    )]
    pub pysvn_version: Option<String>,

    #[arg(
        long,
        value_name = "PATH",
        env = "PYSVN_INSTALLER_SRC_FILE",
        help = "A specific PySVN source tarball to install."
    )]
    pub file: Option<PathBuf>,

    #[arg(
        long,
        env = "PYSVN_INSTALLER_BUILD_ONLY",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new(),
        help = "Build a wheel, but don't install it. The wheel will be stored in the current directory."
    )]
    pub build_only: bool,
}

impl InstallArgs {
    /// Resolves the flags into a request. A local file takes precedence over
    /// any version.
    pub fn to_request(&self, cwd: &Path) -> InstallRequest {
        let source = match &self.file {
            Some(path) => Source::Local(path.clone()),
            None => Source::Remote {
                version: self
                    .pysvn_version
                    .as_ref()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty()),
            },
        };
        let mode = if self.build_only {
            BuildMode::BuildOnly {
                dist_dir: cwd.to_path_buf(),
            }
        } else {
            BuildMode::Install
        };
        InstallRequest { source, mode }
    }

    #[instrument(skip(self, config), fields(version = ?self.pysvn_version, file = ?self.file))]
    pub async fn run(&self, config: &Config) -> Result<()> {
        let cwd = env::current_dir()?;
        let request = self.to_request(&cwd);
        debug!("Install request: {:?}", request);

        let python = python::preflight(config.python.as_deref())?;

        let temp_dir = tempfile::Builder::new()
            .suffix(TEMP_DIR_SUFFIX)
            .tempdir()
            .map_err(|e| PsiError::IoError(format!("Failed to create temporary directory: {e}")))?;
        debug!("Working in temporary directory {}", temp_dir.path().display());

        // Ctrl-C drops the install future (and kills any running build) so the
        // temporary directory is still removed below.
        let interrupted = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Unable to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };
        let outcome = tokio::select! {
            result = install_from(&request, config, &python, temp_dir.path()) => result,
            _ = interrupted => {
                warn!("Interrupted, cleaning up");
                Err(PsiError::Interrupted)
            }
        };

        let temp_path = temp_dir.path().to_path_buf();
        if let Err(e) = temp_dir.close() {
            warn!(
                "Failed to remove temporary directory {}: {}",
                temp_path.display(),
                e
            );
        }
        outcome
    }
}

async fn install_from(
    request: &InstallRequest,
    config: &Config,
    python: &PythonInfo,
    temp_path: &Path,
) -> Result<()> {
    let archive = match &request.source {
        Source::Local(path) => {
            if !path.exists() {
                return Err(PsiError::InvalidArgument(
                    "The provided PySVN tarball does not exist.".to_string(),
                ));
            }
            path.clone()
        }
        Source::Remote { version } => fetch_archive(version.as_deref(), config, temp_path).await?,
    };

    step("Building PySVN...");
    extract_archive(&archive, temp_path)?;
    let src_root = find_source_root(temp_path)?;
    debug!("Source tree: {}", src_root.display());

    let platform = Platform::current();
    prepare_source_tree(&src_root, &platform, config.user.as_deref(), &SystemProbe)?;

    let code = run_build(&python.path, &src_root, &request.mode).await?;
    if code == 0 {
        report_success(&request.mode);
        Ok(())
    } else {
        report_failure(&platform, python);
        Err(PsiError::BuildFailed(code))
    }
}

async fn fetch_archive(version: Option<&str>, config: &Config, temp_path: &Path) -> Result<PathBuf> {
    let client = build_http_client()?;

    let version = match version {
        Some(v) => v.to_string(),
        None => {
            step("Looking up latest PySVN version...");
            let latest = fetch_latest_version(&client, &config.feed_url).await?;
            let chosen = remap_known_bad_release(&latest);
            if chosen != latest {
                debug!("PySVN {} is a known-bad release, using {}", latest, chosen);
            }
            debug!("PySVN {}", chosen);
            chosen.to_string()
        }
    };

    step(&format!("Downloading PySVN {version}..."));
    let url = source_archive_url(&config.download_url_template, &version);
    let spinner = download_spinner(format!("Fetching {url}"));
    let result =
        download_source_archive(&client, &version, &url, &temp_path.join(ARCHIVE_FILENAME)).await;
    spinner.finish_and_clear();
    result
}

fn step(message: &str) {
    println!("{}{}", "==> ".bold().blue(), message.bold());
}

fn download_spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn report_success(mode: &BuildMode) {
    println!();
    if mode.is_build_only() {
        println!("PySVN is built. The wheel is in the current directory.");
    } else {
        println!("PySVN is installed.");
    }
}

fn report_failure(platform: &Platform, python: &PythonInfo) {
    eprintln!();
    eprintln!(
        "{}",
        "PySVN failed to install. You might be missing some dependencies.".red()
    );
    if let Some(hint) = remediation_hint(platform, python.major()) {
        eprintln!("{hint}");
    }
}
