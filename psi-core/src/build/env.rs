// psi-core/src/build/env.rs
//! Candidate include/library/binary locations for APR, APR-util and
//! Subversion, ordered by preference.
use std::path::{Path, PathBuf};

use tracing::debug;

use super::devtools::{multiarch_dirs, Platform, ToolchainProbe};

const XCODE_APR_INCLUDE_DIR: &str =
    "/Library/Developer/CommandLineTools/SDKs/MacOSX.sdk/usr/include/apr-1";
const MACOS_FRAMEWORK_FLAG: &str = "--link-python-framework-via-dynamic-lookup";

const BITNAMI_USER: &str = "bitnami";
const BITNAMI_APR_CONFIG: &str = "/opt/bitnami/apache/bin/apr-1-config";
const BITNAMI_APU_CONFIG: &str = "/opt/bitnami/apache/bin/apu-1-config";
const BITNAMI_SVN_ROOT: &str = "/opt/bitnami/subversion";

const LINUX_LIB_ROOTS: &[&str] = &["/usr/lib", "/usr/local/lib"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    pub apr_include: Vec<PathBuf>,
    pub apr_lib: Vec<PathBuf>,
    pub apu_include: Vec<PathBuf>,
    pub svn_bin: Vec<PathBuf>,
    pub svn_include: Vec<PathBuf>,
    pub svn_lib: Vec<PathBuf>,
    /// Library files proving a lib directory is the right one. `None` on
    /// platforms where no lib directory flag is emitted.
    pub libapr_filename: Option<&'static str>,
    pub libsvn_client_filename: Option<&'static str>,
    /// Platform flags passed to `setup.py configure` unconditionally.
    pub extra_flags: Vec<String>,
}

impl SearchPaths {
    pub fn discover(platform: &Platform, user: Option<&str>, probe: &dyn ToolchainProbe) -> Self {
        let lib_roots: Vec<&Path> = LINUX_LIB_ROOTS.iter().map(Path::new).collect();
        Self::discover_with_lib_roots(platform, user, probe, &lib_roots)
    }

    fn discover_with_lib_roots(
        platform: &Platform,
        user: Option<&str>,
        probe: &dyn ToolchainProbe,
        lib_roots: &[&Path],
    ) -> Self {
        debug!("System = {:?}", platform);
        let mut paths = SearchPaths::default();
        let mut apr_config: Option<PathBuf> = None;
        let mut apu_config: Option<PathBuf> = None;

        match platform {
            Platform::MacOs => {
                debug!("Enabling macOS framework support");
                paths.libapr_filename = Some("libapr-1.dylib");
                paths.libsvn_client_filename = Some("libsvn_client-1.a");
                paths.extra_flags.push(MACOS_FRAMEWORK_FLAG.to_string());

                // Homebrew first, then whatever the Xcode command line tools ship.
                let brew_svn = probe.brew_prefix("subversion");
                let brew_apr = probe.brew_prefix("apr");
                let brew_apr_util = probe.brew_prefix("apr-util");

                if let Some(prefix) = brew_apr {
                    apr_config = Some(prefix.join("bin").join("apr-1-config"));
                }
                if let Some(prefix) = brew_apr_util {
                    apu_config = Some(prefix.join("bin").join("apu-1-config"));
                }
                if let Some(svn) = brew_svn.filter(|p| p.exists()) {
                    paths.svn_bin.push(svn.join("bin"));
                    paths
                        .svn_include
                        .push(svn.join("include").join("subversion-1"));
                    paths.svn_lib.push(svn.join("lib"));
                }

                // Xcode bundles the APR and APU headers in one directory.
                paths.apr_include.push(PathBuf::from(XCODE_APR_INCLUDE_DIR));
                paths.apu_include.push(PathBuf::from(XCODE_APR_INCLUDE_DIR));
            }
            Platform::Linux => {
                paths.libapr_filename = Some("libapr-1.so");
                paths.libsvn_client_filename = Some("libsvn_client-1.so");

                if user == Some(BITNAMI_USER) {
                    debug!("Installing for Bitnami");
                    let svn_root = Path::new(BITNAMI_SVN_ROOT);
                    apr_config = Some(PathBuf::from(BITNAMI_APR_CONFIG));
                    apu_config = Some(PathBuf::from(BITNAMI_APU_CONFIG));
                    paths.svn_bin.push(svn_root.join("bin"));
                    paths.svn_lib.push(svn_root.join("lib"));
                    paths
                        .svn_include
                        .push(svn_root.join("include").join("subversion-1"));
                } else {
                    let arch_dirs = probe
                        .linux_multiarch()
                        .map(|triple| multiarch_dirs(&triple, lib_roots))
                        .unwrap_or_default();
                    debug!("Linux arch directories: {:?}", arch_dirs);
                    paths.apr_lib.extend(arch_dirs.iter().cloned());
                    paths.svn_lib.extend(arch_dirs);
                }
            }
            Platform::Other(name) => {
                debug!("No extra search paths known for platform '{}'", name);
            }
        }

        // Paths reported by the config tools win over everything else.
        if let Some(tool) = apr_config.filter(|t| t.exists()) {
            if let Some(include_dir) = probe.config_tool_query(&tool, "--includedir") {
                paths.apr_include.insert(0, PathBuf::from(include_dir));
            }
            if let Some(prefix) = probe.config_tool_query(&tool, "--prefix") {
                paths.apr_lib.push(Path::new(&prefix).join("lib"));
            }
        }
        if let Some(tool) = apu_config.filter(|t| t.exists()) {
            if let Some(include_dir) = probe.config_tool_query(&tool, "--includedir") {
                paths.apu_include.insert(0, PathBuf::from(include_dir));
            }
        }

        debug!("Extra APR include paths: {:?}", paths.apr_include);
        debug!("Extra APR lib paths: {:?}", paths.apr_lib);
        debug!("Extra APU include paths: {:?}", paths.apu_include);
        debug!("Extra SVN bin paths: {:?}", paths.svn_bin);
        debug!("Extra SVN include paths: {:?}", paths.svn_include);
        debug!("Extra SVN lib paths: {:?}", paths.svn_lib);
        paths
    }
}
