use crate::UPDATE_PROGRESS_EVENT;

const CHECK_FOR_UPDATES_COMMAND: &str = "desktop_bridge_check_for_updates";
const GET_APP_VERSION_COMMAND: &str = "desktop_bridge_get_app_version";

/// Initialization script injected into the main window before page scripts
/// run. Exposes `window.desktopShell` to the rendering surface.
pub(crate) fn preload_bridge_script() -> String {
    format!(
        r#"(function () {{
  if (window.desktopShell) {{
    return;
  }}
  const tauri = () => window.__TAURI__;
  Object.defineProperty(window, "desktopShell", {{
    configurable: false,
    writable: false,
    value: Object.freeze({{
      isDesktopRuntime: true,
      onUpdateProgress(callback) {{
        return tauri().event.listen("{progress_event}", (event) => callback(event.payload));
      }},
      checkForUpdates() {{
        return tauri().core.invoke("{check_command}");
      }},
      getAppVersion() {{
        return tauri().core.invoke("{version_command}");
      }},
    }}),
  }});
}})();"#,
        progress_event = UPDATE_PROGRESS_EVENT,
        check_command = CHECK_FOR_UPDATES_COMMAND,
        version_command = GET_APP_VERSION_COMMAND,
    )
}
