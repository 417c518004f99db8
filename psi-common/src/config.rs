// psi-common/src/config.rs
use std::env;

use tracing::debug;

use super::error::Result;

pub const DEFAULT_FEED_URL: &str = "https://sourceforge.net/projects/pysvn/rss?path=/pysvn&limit=10";
pub const DEFAULT_DOWNLOAD_URL_TEMPLATE: &str =
    "https://sourceforge.net/projects/pysvn/files/pysvn/V{version}/pysvn-{version}.tar.gz/download";
pub const SUPPORT_CONTACT: &str = "support@beanbaginc.com";

const FEED_URL_ENV: &str = "PYSVN_INSTALLER_FEED_URL";
const DOWNLOAD_URL_ENV: &str = "PYSVN_INSTALLER_DOWNLOAD_URL";
const PYTHON_ENV: &str = "PYSVN_INSTALLER_PYTHON";
const DEBUG_ENV: &str = "DEBUG_PYSVN_INSTALLER";

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    /// Archive URL with `{version}` placeholders.
    pub download_url_template: String,
    /// Interpreter name or path; `None` means search PATH for `python3`, then `python`.
    pub python: Option<String>,
    pub user: Option<String>,
    pub debug: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        debug!("Loading installer configuration");
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let feed_url = non_empty(FEED_URL_ENV).unwrap_or_else(|| DEFAULT_FEED_URL.to_string());

        let download_url_template =
            non_empty(DOWNLOAD_URL_ENV).unwrap_or_else(|| DEFAULT_DOWNLOAD_URL_TEMPLATE.to_string());
        if !download_url_template.contains("{version}") {
            return Err(super::error::PsiError::Config(format!(
                "{DOWNLOAD_URL_ENV} must contain a '{{version}}' placeholder, got '{download_url_template}'"
            )));
        }

        let python = non_empty(PYTHON_ENV);
        let user = non_empty("USER").or_else(|| non_empty("LOGNAME"));
        let debug = lookup(DEBUG_ENV).is_some_and(|v| v == "1");

        debug!("Feed URL: {}", feed_url);
        debug!("Download URL template: {}", download_url_template);
        debug!("Python override: {:?}", python);
        Ok(Self {
            feed_url,
            download_url_template,
            python,
            user,
            debug,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::PsiError;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_point_at_sourceforge() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.download_url_template, DEFAULT_DOWNLOAD_URL_TEMPLATE);
        assert!(config.python.is_none());
        assert!(config.user.is_none());
        assert!(!config.debug);
    }

    #[test]
    fn debug_switch_requires_exactly_one() {
        assert!(config_from(&[("DEBUG_PYSVN_INSTALLER", "1")]).unwrap().debug);
        assert!(!config_from(&[("DEBUG_PYSVN_INSTALLER", "yes")]).unwrap().debug);
    }

    #[test]
    fn user_falls_back_to_logname() {
        let config = config_from(&[("USER", ""), ("LOGNAME", "bitnami")]).unwrap();
        assert_eq!(config.user.as_deref(), Some("bitnami"));
    }

    #[test]
    fn download_template_needs_placeholder() {
        let err = config_from(&[("PYSVN_INSTALLER_DOWNLOAD_URL", "https://example.com/x.tar.gz")])
            .unwrap_err();
        assert!(matches!(err, PsiError::Config(_)));
    }

    #[test]
    fn python_override_is_kept_verbatim() {
        let config = config_from(&[("PYSVN_INSTALLER_PYTHON", "/opt/py/bin/python3.12")]).unwrap();
        assert_eq!(config.python.as_deref(), Some("/opt/py/bin/python3.12"));
    }
}
