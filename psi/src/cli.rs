// psi/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser};

pub mod install;

pub use crate::cli::install::InstallArgs;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None, name = "pysvn-installer", bin_name = "pysvn-installer")]
#[command(about = "Builds PySVN from source and installs it, working through platform differences")]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub install: InstallArgs,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::path::{Path, PathBuf};

    use psi_common::model::{BuildMode, Source};
    use serial_test::serial;

    use super::*;

    const ENV_VARS: &[&str] = &[
        "PYSVN_INSTALLER_VERSION",
        "PYSVN_INSTALLER_SRC_FILE",
        "PYSVN_INSTALLER_BUILD_ONLY",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn defaults_to_latest_remote_install() {
        clear_env();
        let args = CliArgs::try_parse_from(["pysvn-installer"]).unwrap();
        let request = args.install.to_request(Path::new("/work"));
        assert_eq!(request.source, Source::Remote { version: None });
        assert_eq!(request.mode, BuildMode::Install);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    #[serial]
    fn flags_select_version_file_and_build_only() {
        clear_env();
        let args = CliArgs::try_parse_from([
            "pysvn-installer",
            "-vv",
            "--pysvn-version",
            "1.9.12",
            "--build-only",
        ])
        .unwrap();
        let request = args.install.to_request(Path::new("/work"));
        assert_eq!(
            request.source,
            Source::Remote {
                version: Some("1.9.12".to_string())
            }
        );
        assert_eq!(
            request.mode,
            BuildMode::BuildOnly {
                dist_dir: PathBuf::from("/work")
            }
        );
        assert_eq!(args.verbose, 2);

        let args =
            CliArgs::try_parse_from(["pysvn-installer", "--file", "pysvn-1.9.12.tar.gz"]).unwrap();
        assert_eq!(
            args.install.to_request(Path::new("/work")).source,
            Source::Local(PathBuf::from("pysvn-1.9.12.tar.gz"))
        );
    }

    #[test]
    #[serial]
    fn environment_provides_defaults() {
        clear_env();
        env::set_var("PYSVN_INSTALLER_VERSION", "1.9.10");
        env::set_var("PYSVN_INSTALLER_BUILD_ONLY", "1");

        let args = CliArgs::try_parse_from(["pysvn-installer"]).unwrap();
        clear_env();

        let request = args.install.to_request(Path::new("/work"));
        assert_eq!(
            request.source,
            Source::Remote {
                version: Some("1.9.10".to_string())
            }
        );
        assert!(request.mode.is_build_only());
    }

    #[test]
    #[serial]
    fn falsey_build_only_env_is_ignored() {
        for value in ["false", "0", "no", "OFF", "n", "f", ""] {
            clear_env();
            env::set_var("PYSVN_INSTALLER_BUILD_ONLY", value);

            let args = CliArgs::try_parse_from(["pysvn-installer"]).unwrap();
            clear_env();

            assert!(!args.install.build_only, "{value:?} enabled build-only");
        }
    }

    #[test]
    #[serial]
    fn any_other_build_only_env_value_enables_it() {
        for value in ["1", "yes", "true", "please"] {
            clear_env();
            env::set_var("PYSVN_INSTALLER_BUILD_ONLY", value);

            let args = CliArgs::try_parse_from(["pysvn-installer"]).unwrap();
            clear_env();

            assert!(args.install.build_only, "{value:?} left build-only off");
        }
    }

    #[test]
    #[serial]
    fn local_file_wins_over_version() {
        clear_env();
        env::set_var("PYSVN_INSTALLER_SRC_FILE", "/dl/pysvn.tar.gz");

        let args =
            CliArgs::try_parse_from(["pysvn-installer", "--pysvn-version", "1.9.12"]).unwrap();
        clear_env();

        assert_eq!(
            args.install.to_request(Path::new("/work")).source,
            Source::Local(PathBuf::from("/dl/pysvn.tar.gz"))
        );
    }
}
