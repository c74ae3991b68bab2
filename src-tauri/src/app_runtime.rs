use tauri::{Manager, RunEvent};

use crate::{
    app_config::ShellConfig, append_desktop_log, append_startup_log, exit_events, logging,
    main_window::{self, MainWindowConfig},
    update_runtime::UpdateRuntime,
};

pub(crate) fn run() {
    let config = ShellConfig::from_env();
    let log_path = logging::init_desktop_log_path(config.log_dir.clone());

    append_startup_log("desktop process starting");
    append_startup_log(&format!("desktop log path: {}", log_path.display()));
    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app_handle, _args, _cwd| {
            append_desktop_log("second instance launched; focusing main window");
            main_window::ensure_main_window(app_handle, append_desktop_log);
        }))
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(tauri_plugin_dialog::init())
        .invoke_handler(tauri::generate_handler![
            crate::desktop_bridge_commands::desktop_bridge_is_desktop_runtime,
            crate::desktop_bridge_commands::desktop_bridge_get_app_version,
            crate::desktop_bridge_commands::desktop_bridge_check_for_updates,
        ])
        .setup(move |app| {
            let app_handle = app.handle().clone();
            if let Err(error) = main_window::create_main_window(
                &app_handle,
                &MainWindowConfig::default(),
                append_startup_log,
            ) {
                append_startup_log(&error);
            }

            let configured_pubkey = app_handle
                .config()
                .plugins
                .0
                .get("updater")
                .and_then(|updater| updater.get("pubkey"))
                .and_then(|pubkey| pubkey.as_str())
                .map(str::to_string);
            match config.updater_blocked_reason(configured_pubkey.as_deref()) {
                Some(reason) => append_startup_log(&reason),
                None => {
                    let update_runtime = UpdateRuntime::start(&app_handle, &config);
                    if !app_handle.manage(update_runtime) {
                        append_startup_log("update runtime already exists, skipping manage");
                    }
                }
            }

            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, api, .. } => {
                exit_events::handle_exit_requested(code, &api);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen { .. } => {
                exit_events::handle_reopen(app_handle);
            }
            _ => {}
        });
}
