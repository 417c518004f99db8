#![allow(dead_code)]

use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use std::process;

use anyhow::Result;
use assert_cmd::cargo::CommandCargoExt;
use assert_cmd::Command;
use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};
use tempfile::TempDir;

pub const SETUP_PY: &str = "import os\n\
os.system('%s setup.py configure' % sys.executable)\n";

/// Stands in for the Python interpreter: answers the preflight probes, records
/// every invocation and copies the patched `setup.py` next to its log.
const FAKE_PYTHON: &str = r#"#!/bin/sh
printf '%s\n' "$*" >> "$PSI_FAKE_PYTHON_LOG"
case "$1" in
  -c)
    if [ -n "$PSI_FAKE_MISSING_MODULE" ] && [ "$2" = "import $PSI_FAKE_MISSING_MODULE" ]; then
      exit 1
    fi
    echo "3.11"
    ;;
  -m)
    cp setup.py "$PSI_FAKE_PYTHON_LOG.setup.py"
    if [ -n "$PSI_FAKE_BUILD_SLEEP" ]; then
      sleep "$PSI_FAKE_BUILD_SLEEP"
    fi
    exit "${PSI_FAKE_BUILD_STATUS:-0}"
    ;;
  setup.py)
    cp setup.py "$PSI_FAKE_PYTHON_LOG.setup.py"
    touch "$4/pysvn-0.0.0-cp311-fake.whl"
    exit "${PSI_FAKE_BUILD_STATUS:-0}"
    ;;
esac
"#;

pub struct TestEnvironment {
    root: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir()?;
        fs::create_dir(root.path().join("tmp"))?;
        fs::create_dir(root.path().join("work"))?;
        let python = root.path().join("python");
        fs::write(&python, FAKE_PYTHON)?;
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755))?;
        Ok(Self { root })
    }

    pub fn tmp(&self) -> PathBuf {
        self.root.path().join("tmp")
    }

    pub fn work(&self) -> PathBuf {
        self.root.path().join("work")
    }

    pub fn python_log(&self) -> PathBuf {
        self.root.path().join("python.log")
    }

    pub fn python_calls(&self) -> String {
        fs::read_to_string(self.python_log()).unwrap_or_default()
    }

    pub fn patched_setup_py(&self) -> Option<String> {
        fs::read_to_string(self.root.path().join("python.log.setup.py")).ok()
    }

    /// Scratch directories the installer left behind in its TMPDIR.
    pub fn leftover_temp_dirs(&self) -> Vec<PathBuf> {
        fs::read_dir(self.tmp())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.to_string_lossy().ends_with(".pysvn-install"))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The installer binary wired to the fake interpreter. Feed and download
    /// URLs point at a closed local port so any network use fails fast.
    pub fn command(&self) -> Command {
        Command::from_std(self.std_command())
    }

    /// Same as [`TestEnvironment::command`], for tests that spawn the
    /// installer and signal it while it runs.
    pub fn std_command(&self) -> process::Command {
        let mut cmd = process::Command::cargo_bin("pysvn-installer").unwrap();
        cmd.current_dir(self.work())
            .env("TMPDIR", self.tmp())
            .env("PYSVN_INSTALLER_PYTHON", self.root.path().join("python"))
            .env("PSI_FAKE_PYTHON_LOG", self.python_log())
            .env("PYSVN_INSTALLER_FEED_URL", "https://127.0.0.1:9/rss")
            .env(
                "PYSVN_INSTALLER_DOWNLOAD_URL",
                "https://127.0.0.1:9/pysvn-{version}.tar.gz",
            )
            .env("USER", "tester")
            .env("NO_COLOR", "1")
            .env_remove("PYSVN_INSTALLER_VERSION")
            .env_remove("PYSVN_INSTALLER_SRC_FILE")
            .env_remove("PYSVN_INSTALLER_BUILD_ONLY")
            .env_remove("DEBUG_PYSVN_INSTALLER")
            .env_remove("PSI_LOG")
            .env_remove("PSI_FAKE_BUILD_SLEEP");
        cmd
    }

    pub fn write_archive(&self, name: &str, entries: &[(&str, &str)]) -> Result<PathBuf> {
        let path = self.root.path().join(name);
        write_tar_gz(&path, entries)?;
        Ok(path)
    }
}

/// A minimal source release: `setup.py` plus a bundled PyCXX directory.
pub fn source_release() -> Vec<(&'static str, &'static str)> {
    vec![
        ("pysvn-1.9.12/setup.py", SETUP_PY),
        ("pysvn-1.9.12/Import/pycxx-7.1.4/CXX/Version.hxx", "#define PYCXX 7\n"),
    ]
}

fn write_tar_gz(path: &Path, entries: &[(&str, &str)]) -> Result<()> {
    let file = File::create(path)?;
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
    for (name, data) in entries {
        // Written straight into the header so that hostile names survive.
        let mut header = Header::new_gnu();
        header.as_old_mut().name[..name.len()].copy_from_slice(name.as_bytes());
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(EntryType::Regular);
        header.set_cksum();
        builder.append(&header, data.as_bytes())?;
    }
    builder.into_inner()?.finish()?;
    Ok(())
}
