use std::{env, path::PathBuf, time::Duration};

use url::Url;

use crate::{
    DEFAULT_UPDATE_CHECK_INTERVAL, ENV_LOG_DIR, ENV_UPDATER_ENABLED, ENV_UPDATER_ENDPOINTS,
    ENV_UPDATER_PUBKEY, ENV_UPDATE_CHECK_INTERVAL_SECS, MIN_UPDATE_CHECK_INTERVAL,
    UPDATER_PUBKEY_PLACEHOLDER,
};

/// Runtime overrides layered on top of `tauri.conf.json`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ShellConfig {
    pub(crate) updater_enabled: bool,
    pub(crate) check_interval: Duration,
    pub(crate) updater_endpoints: Vec<Url>,
    pub(crate) updater_pubkey: Option<String>,
    pub(crate) log_dir: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            updater_enabled: true,
            check_interval: DEFAULT_UPDATE_CHECK_INTERVAL,
            updater_endpoints: Vec::new(),
            updater_pubkey: None,
            log_dir: None,
        }
    }
}

impl ShellConfig {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let updater_enabled = lookup(ENV_UPDATER_ENABLED)
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(true);
        let check_interval = lookup(ENV_UPDATE_CHECK_INTERVAL_SECS)
            .as_deref()
            .and_then(parse_interval_secs)
            .unwrap_or(DEFAULT_UPDATE_CHECK_INTERVAL);
        let updater_endpoints = lookup(ENV_UPDATER_ENDPOINTS)
            .as_deref()
            .map(parse_endpoints)
            .unwrap_or_default();
        let updater_pubkey = lookup(ENV_UPDATER_PUBKEY)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        let log_dir = lookup(ENV_LOG_DIR)
            .map(|value| PathBuf::from(value.trim()))
            .filter(|path| !path.as_os_str().is_empty());

        Self {
            updater_enabled,
            check_interval,
            updater_endpoints,
            updater_pubkey,
            log_dir,
        }
    }

    /// Why the update runtime must not start, if anything. The environment
    /// pubkey wins over the one bundled in `tauri.conf.json`; without a real
    /// key every download would fail signature verification.
    pub(crate) fn updater_blocked_reason(
        &self,
        configured_pubkey: Option<&str>,
    ) -> Option<String> {
        if !self.updater_enabled {
            return Some(format!("automatic updates disabled by {ENV_UPDATER_ENABLED}"));
        }

        let pubkey = self
            .updater_pubkey
            .as_deref()
            .or(configured_pubkey)
            .map(str::trim)
            .unwrap_or_default();
        if pubkey.is_empty() || pubkey == UPDATER_PUBKEY_PLACEHOLDER {
            return Some(format!(
                "automatic updates disabled: no updater pubkey configured (set {ENV_UPDATER_PUBKEY} or plugins.updater.pubkey)"
            ));
        }
        None
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_interval_secs(raw: &str) -> Option<Duration> {
    let secs: u64 = raw.trim().parse().ok()?;
    Some(Duration::from_secs(secs).max(MIN_UPDATE_CHECK_INTERVAL))
}

fn parse_endpoints(raw: &str) -> Vec<Url> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .filter_map(|value| Url::parse(value).ok())
        .collect()
}
