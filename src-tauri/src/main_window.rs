use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

use crate::{
    desktop_bridge, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, MAIN_WINDOW_ENTRY,
    MAIN_WINDOW_LABEL, MAIN_WINDOW_TITLE,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MainWindowConfig {
    pub(crate) label: &'static str,
    pub(crate) title: &'static str,
    pub(crate) width: f64,
    pub(crate) height: f64,
    pub(crate) entry: &'static str,
}

impl Default for MainWindowConfig {
    fn default() -> Self {
        Self {
            label: MAIN_WINDOW_LABEL,
            title: MAIN_WINDOW_TITLE,
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
            entry: MAIN_WINDOW_ENTRY,
        }
    }
}

/// The current window, if one has been created and not yet closed.
pub(crate) fn current_main_window(app_handle: &AppHandle) -> Option<WebviewWindow> {
    app_handle.get_webview_window(MAIN_WINDOW_LABEL)
}

pub(crate) fn create_main_window<F>(
    app_handle: &AppHandle,
    config: &MainWindowConfig,
    log: F,
) -> Result<WebviewWindow, String>
where
    F: Fn(&str),
{
    if let Some(existing) = app_handle.get_webview_window(config.label) {
        log("main window already exists; reusing it");
        return Ok(existing);
    }

    let window = WebviewWindowBuilder::new(
        app_handle,
        config.label,
        WebviewUrl::App(config.entry.into()),
    )
    .title(config.title)
    .inner_size(config.width, config.height)
    .initialization_script(&desktop_bridge::preload_bridge_script())
    .build()
    .map_err(|error| format!("Failed to create main window: {error}"))?;

    log(&format!("main window created ({}x{})", config.width, config.height));
    Ok(window)
}

/// Recreates the window when it is gone, otherwise brings it forward.
pub(crate) fn ensure_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str),
{
    let Some(window) = current_main_window(app_handle) else {
        if let Err(error) = create_main_window(app_handle, &MainWindowConfig::default(), &log) {
            log(&error);
        }
        return;
    };

    if let Err(error) = window.unminimize() {
        log(&format!("failed to unminimize main window: {error}"));
    }
    if let Err(error) = window.show() {
        log(&format!("failed to show main window: {error}"));
    }
    if let Err(error) = window.set_focus() {
        log(&format!("failed to focus main window: {error}"));
    }
}
