#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_config;
mod app_constants;
mod app_runtime;
mod app_types;
mod desktop_bridge;
mod desktop_bridge_commands;
mod exit_events;
mod logging;
mod main_window;
mod update_client;
mod update_orchestrator;
mod update_runtime;
mod update_schedule;
mod update_shell;

#[cfg(test)]
mod test_support;

pub(crate) use app_constants::*;
pub(crate) use app_types::{
    BridgeResult, CheckOrigin, ConsentChoice, ConsentPrompt, DownloadProgress, UpdateEvent,
    UpdateInfo,
};
pub(crate) use logging::{
    append_desktop_log, append_shutdown_log, append_startup_log, append_update_log,
};

fn main() {
    app_runtime::run();
}
