use tauri::{AppHandle, ExitRequestApi, Manager};

use crate::{append_shutdown_log, update_runtime::UpdateRuntime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitDecision {
    StayResident,
    Exit,
}

/// Closing the last window quits everywhere except macOS. An explicit exit
/// code means the app asked to quit or restart, which is always honored.
fn decide_exit(exit_code: Option<i32>, is_macos: bool) -> ExitDecision {
    if exit_code.is_none() && is_macos {
        ExitDecision::StayResident
    } else {
        ExitDecision::Exit
    }
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn should_recreate_window(open_window_count: usize) -> bool {
    open_window_count == 0
}

pub(crate) fn handle_exit_requested(exit_code: Option<i32>, api: &ExitRequestApi) {
    match decide_exit(exit_code, cfg!(target_os = "macos")) {
        ExitDecision::StayResident => {
            append_shutdown_log("all windows closed; staying resident until reactivated");
            api.prevent_exit();
        }
        ExitDecision::Exit => {
            append_shutdown_log(&format!("exit requested (code={exit_code:?})"));
        }
    }
}

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    if let Some(runtime) = app_handle.try_state::<UpdateRuntime>() {
        runtime.shutdown(append_shutdown_log);
    }
    append_shutdown_log("desktop process exiting");
}

/// Reactivation (dock click) with no windows left recreates the main window.
#[cfg(target_os = "macos")]
pub(crate) fn handle_reopen(app_handle: &AppHandle) {
    if should_recreate_window(app_handle.webview_windows().len()) {
        crate::append_desktop_log("app reactivated without windows; recreating main window");
        crate::main_window::ensure_main_window(app_handle, crate::append_desktop_log);
    }
}
