use std::future::Future;

use tauri::{AppHandle, Emitter};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tokio::sync::oneshot;

use crate::{
    main_window, ConsentChoice, ConsentPrompt, DownloadProgress, MAIN_WINDOW_LABEL,
    UPDATE_PROGRESS_EVENT,
};

/// The window-facing side of the update flow.
pub(crate) trait UpdateShell: Send + Sync + 'static {
    fn has_window(&self) -> bool;

    fn send_progress(&self, progress: &DownloadProgress) -> Result<(), String>;

    fn confirm(
        &self,
        prompt: ConsentPrompt,
    ) -> impl Future<Output = Result<ConsentChoice, String>> + Send;

    fn show_error_box(&self, title: &str, message: &str);
}

pub(crate) struct TauriUpdateShell {
    app_handle: AppHandle,
}

impl TauriUpdateShell {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }
}

impl UpdateShell for TauriUpdateShell {
    fn has_window(&self) -> bool {
        main_window::current_main_window(&self.app_handle).is_some()
    }

    fn send_progress(&self, progress: &DownloadProgress) -> Result<(), String> {
        if !self.has_window() {
            return Ok(());
        }

        self.app_handle
            .emit_to(MAIN_WINDOW_LABEL, UPDATE_PROGRESS_EVENT, progress)
            .map_err(|error| format!("Failed to forward update progress: {error}"))
    }

    async fn confirm(&self, prompt: ConsentPrompt) -> Result<ConsentChoice, String> {
        let window = main_window::current_main_window(&self.app_handle)
            .ok_or_else(|| "Main window is not available for the update dialog.".to_string())?;

        let (sender, receiver) = oneshot::channel();
        self.app_handle
            .dialog()
            .message(prompt.message)
            .title(prompt.title)
            .kind(MessageDialogKind::Info)
            .buttons(MessageDialogButtons::OkCancelCustom(
                prompt.accept_label.to_string(),
                prompt.decline_label.to_string(),
            ))
            .parent(&window)
            .show(move |accepted| {
                let _ = sender.send(accepted);
            });

        let accepted = receiver
            .await
            .map_err(|_| "Update dialog closed without a response.".to_string())?;
        Ok(if accepted {
            ConsentChoice::Accepted
        } else {
            ConsentChoice::Declined
        })
    }

    fn show_error_box(&self, title: &str, message: &str) {
        let mut builder = self
            .app_handle
            .dialog()
            .message(message)
            .title(title)
            .kind(MessageDialogKind::Error)
            .buttons(MessageDialogButtons::Ok);
        if let Some(window) = main_window::current_main_window(&self.app_handle) {
            builder = builder.parent(&window);
        }
        builder.show(|_| {});
    }
}
