use std::time::Duration;

pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const MAIN_WINDOW_TITLE: &str = "Desktop Shell";
pub(crate) const MAIN_WINDOW_ENTRY: &str = "index.html";
pub(crate) const DEFAULT_WINDOW_WIDTH: f64 = 800.0;
pub(crate) const DEFAULT_WINDOW_HEIGHT: f64 = 600.0;

pub(crate) const UPDATE_PROGRESS_EVENT: &str = "update-progress";
pub(crate) const DEFAULT_UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(4 * 60 * 60);
pub(crate) const MIN_UPDATE_CHECK_INTERVAL: Duration = Duration::from_secs(60);
pub(crate) const PROGRESS_REPORT_INTERVAL: Duration = Duration::from_secs(1);
pub(crate) const UPDATER_PUBKEY_PLACEHOLDER: &str = "REPLACE_WITH_RELEASE_PUBKEY";

pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";
pub(crate) const DESKTOP_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub(crate) const DESKTOP_DATA_DIR_NAME: &str = ".desktop-shell";

pub(crate) const ENV_UPDATER_ENABLED: &str = "DESKTOP_SHELL_UPDATER_ENABLED";
pub(crate) const ENV_UPDATE_CHECK_INTERVAL_SECS: &str = "DESKTOP_SHELL_UPDATE_CHECK_INTERVAL_SECS";
pub(crate) const ENV_UPDATER_ENDPOINTS: &str = "DESKTOP_SHELL_UPDATER_ENDPOINTS";
pub(crate) const ENV_UPDATER_PUBKEY: &str = "DESKTOP_SHELL_UPDATER_PUBKEY";
pub(crate) const ENV_LOG_DIR: &str = "DESKTOP_SHELL_LOG_DIR";
