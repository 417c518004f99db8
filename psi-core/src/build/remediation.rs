// psi-core/src/build/remediation.rs
use super::devtools::Platform;

/// Instructions for installing the build dependencies PySVN needs, shown
/// after a failed build.
pub fn remediation_hint(platform: &Platform, python_major: Option<u32>) -> Option<String> {
    match platform {
        Platform::MacOs => Some(
            [
                "On macOS, run:",
                "",
                "    $ xcode-select --install",
                "    $ brew install subversion",
                "",
                "Note that you will need to install Homebrew from https://brew.sh/",
            ]
            .join("\n"),
        ),
        Platform::Linux => {
            // Distros name their packages after the interpreter generation.
            let pkg_prefix = match python_major {
                Some(2) => "python",
                _ => "python3",
            };
            Some(
                [
                    "On Linux, you will need Python development headers and".to_string(),
                    "Subversion development libraries.".to_string(),
                    String::new(),
                    "For Ubuntu:".to_string(),
                    String::new(),
                    format!("    $ sudo apt-get install {pkg_prefix}-dev"),
                    format!("    $ sudo apt-get build-dep {pkg_prefix}-svn"),
                    String::new(),
                    "For RHEL/CentOS:".to_string(),
                    String::new(),
                    format!("    $ sudo yum install {pkg_prefix}-devel subversion-devel"),
                ]
                .join("\n"),
            )
        }
        Platform::Other(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macos_points_at_homebrew() {
        let hint = remediation_hint(&Platform::MacOs, Some(3)).unwrap();
        assert!(hint.contains("xcode-select --install"));
        assert!(hint.contains("brew install subversion"));
        assert!(hint.contains("https://brew.sh/"));
    }

    #[test]
    fn linux_packages_follow_python_generation() {
        let py3 = remediation_hint(&Platform::Linux, Some(3)).unwrap();
        assert!(py3.contains("apt-get install python3-dev"));
        assert!(py3.contains("apt-get build-dep python3-svn"));
        assert!(py3.contains("yum install python3-devel subversion-devel"));

        let py2 = remediation_hint(&Platform::Linux, Some(2)).unwrap();
        assert!(py2.contains("apt-get install python-dev"));
        assert!(!py2.contains("python3"));
    }

    #[test]
    fn unknown_python_defaults_to_python3_packages() {
        let hint = remediation_hint(&Platform::Linux, None).unwrap();
        assert!(hint.contains("python3-dev"));
        let hint = remediation_hint(&Platform::Linux, Some(4)).unwrap();
        assert!(hint.contains("python3-dev"));
    }

    #[test]
    fn other_platforms_have_no_hint() {
        assert_eq!(
            remediation_hint(&Platform::Other("windows".to_string()), Some(3)),
            None
        );
    }
}
