use std::{
    env,
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use chrono::{Local, NaiveDateTime};

use crate::{DESKTOP_DATA_DIR_NAME, DESKTOP_LOG_FILE, DESKTOP_LOG_MAX_BYTES};

static DESKTOP_LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

pub(crate) fn resolve_desktop_log_path(log_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    log_dir
        .or_else(|| home::home_dir().map(|home| home.join(DESKTOP_DATA_DIR_NAME).join("logs")))
        .unwrap_or_else(env::temp_dir)
        .join(file_name)
}

/// Pins the log location for the rest of the process. Later calls keep the
/// first path.
pub(crate) fn init_desktop_log_path(log_dir: Option<PathBuf>) -> &'static Path {
    DESKTOP_LOG_PATH.get_or_init(|| resolve_desktop_log_path(log_dir, DESKTOP_LOG_FILE))
}

fn desktop_log_path() -> &'static Path {
    init_desktop_log_path(None)
}

pub(crate) fn format_log_line(timestamp: NaiveDateTime, scope: &str, message: &str) -> String {
    format!(
        "[{}] [{}] {}\n",
        timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        scope,
        message
    )
}

pub(crate) fn rotate_if_oversized(path: &Path, max_bytes: u64) -> Result<(), String> {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(error) => {
            return Err(format!(
                "Failed to read log metadata {}: {}",
                path.display(),
                error
            ))
        }
    };
    if size <= max_bytes {
        return Ok(());
    }

    let mut rotated = path.as_os_str().to_owned();
    rotated.push(".1");
    fs::rename(path, PathBuf::from(rotated))
        .map_err(|error| format!("Failed to rotate log {}: {}", path.display(), error))
}

pub(crate) fn append_log_line(path: &Path, line: &str) -> Result<(), String> {
    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).map_err(|error| {
            format!(
                "Failed to create log directory {}: {}",
                parent_dir.display(),
                error
            )
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| format!("Failed to open log {}: {}", path.display(), error))?;
    file.write_all(line.as_bytes())
        .map_err(|error| format!("Failed to write log {}: {}", path.display(), error))
}

fn append_scoped_log(scope: &str, message: &str) {
    let line = format_log_line(Local::now().naive_local(), scope, message);
    if cfg!(debug_assertions) {
        eprint!("{line}");
    }

    let path = desktop_log_path();
    if let Err(error) = rotate_if_oversized(path, DESKTOP_LOG_MAX_BYTES)
        .and_then(|()| append_log_line(path, &line))
    {
        eprintln!("desktop log unavailable: {error}");
    }
}

pub(crate) fn append_desktop_log(message: &str) {
    append_scoped_log("desktop", message);
}

pub(crate) fn append_startup_log(message: &str) {
    append_scoped_log("startup", message);
}

pub(crate) fn append_update_log(message: &str) {
    append_scoped_log("update", message);
}

pub(crate) fn append_shutdown_log(message: &str) {
    append_scoped_log("shutdown", message);
}
