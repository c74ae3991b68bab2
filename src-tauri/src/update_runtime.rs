use std::sync::Arc;

use tauri::AppHandle;
use tokio::sync::{mpsc, watch};

use crate::{
    app_config::ShellConfig,
    append_update_log,
    update_client::TauriUpdateClient,
    update_orchestrator::{LogSink, UpdateOrchestrator},
    update_schedule,
    update_shell::TauriUpdateShell,
    CheckOrigin,
};

pub(crate) type TauriUpdateOrchestrator = UpdateOrchestrator<TauriUpdateClient, TauriUpdateShell>;

/// Managed state tying the update tasks to the process lifetime.
pub(crate) struct UpdateRuntime {
    orchestrator: TauriUpdateOrchestrator,
    client: Arc<TauriUpdateClient>,
    shutdown: watch::Sender<bool>,
}

impl UpdateRuntime {
    /// Spawns the event loop, the startup check and the periodic checks.
    pub(crate) fn start(app_handle: &AppHandle, config: &ShellConfig) -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        let (shutdown, shutdown_receiver) = watch::channel(false);

        let client = Arc::new(TauriUpdateClient::new(
            app_handle.clone(),
            config.clone(),
            event_sender,
        ));
        let shell = Arc::new(TauriUpdateShell::new(app_handle.clone()));
        let log: LogSink = Arc::new(append_update_log);
        let orchestrator = UpdateOrchestrator::new(Arc::clone(&client), shell, log);

        tauri::async_runtime::spawn(
            orchestrator
                .clone()
                .run(event_receiver, shutdown_receiver.clone()),
        );

        let startup_orchestrator = orchestrator.clone();
        tauri::async_runtime::spawn(async move {
            startup_orchestrator
                .check_for_updates(CheckOrigin::Startup)
                .await;
        });

        append_update_log(&format!(
            "scheduling update checks every {}s",
            config.check_interval.as_secs()
        ));
        tauri::async_runtime::spawn(update_schedule::run_periodic_checks(
            orchestrator.clone(),
            config.check_interval,
            shutdown_receiver,
        ));

        Self {
            orchestrator,
            client,
            shutdown,
        }
    }

    pub(crate) fn orchestrator(&self) -> &TauriUpdateOrchestrator {
        &self.orchestrator
    }

    /// Stops the timer and the event loop, then installs any update the user
    /// deferred.
    pub(crate) fn shutdown<F>(&self, log: F)
    where
        F: Fn(&str),
    {
        if self.shutdown.send(true).is_err() {
            log("update tasks already stopped");
        }
        self.client.install_staged_on_exit(log);
    }
}
