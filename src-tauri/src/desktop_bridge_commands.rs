use tauri::{AppHandle, Manager};

use crate::{update_runtime::UpdateRuntime, BridgeResult, CheckOrigin};

#[tauri::command]
pub(crate) fn desktop_bridge_is_desktop_runtime() -> bool {
    true
}

#[tauri::command]
pub(crate) fn desktop_bridge_get_app_version(app_handle: AppHandle) -> String {
    app_handle.package_info().version.to_string()
}

#[tauri::command]
pub(crate) async fn desktop_bridge_check_for_updates(app_handle: AppHandle) -> BridgeResult {
    let orchestrator = match app_handle.try_state::<UpdateRuntime>() {
        Some(runtime) => runtime.orchestrator().clone(),
        None => return BridgeResult::failed("Automatic updates are disabled."),
    };

    orchestrator.check_for_updates(CheckOrigin::Manual).await;
    BridgeResult::ok()
}
