use std::sync::Arc;

use tokio::{
    sync::{mpsc::UnboundedReceiver, watch},
    task::JoinSet,
};

use crate::{
    update_client::UpdateClient, update_shell::UpdateShell, CheckOrigin, ConsentChoice,
    ConsentPrompt, DownloadProgress, UpdateEvent, UpdateInfo,
};

pub(crate) type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

const UPDATE_ERROR_TITLE: &str = "Update Error";

/// Single consumer of update events. Decides which prompts to show and which
/// client command follows each answer.
pub(crate) struct UpdateOrchestrator<C, S> {
    client: Arc<C>,
    shell: Arc<S>,
    log: LogSink,
}

impl<C, S> Clone for UpdateOrchestrator<C, S> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            shell: Arc::clone(&self.shell),
            log: Arc::clone(&self.log),
        }
    }
}

impl<C, S> UpdateOrchestrator<C, S>
where
    C: UpdateClient,
    S: UpdateShell,
{
    pub(crate) fn new(client: Arc<C>, shell: Arc<S>, log: LogSink) -> Self {
        Self { client, shell, log }
    }

    fn log(&self, message: &str) {
        (self.log)(message);
    }

    /// Rejections are logged once and swallowed.
    pub(crate) async fn check_for_updates(&self, origin: CheckOrigin) {
        if let Err(error) = self.client.check_for_updates().await {
            self.log(&format!("error in {}: {error}", origin.describe()));
        }
    }

    pub(crate) async fn handle_event(&self, event: UpdateEvent) {
        match event {
            UpdateEvent::CheckingForUpdate => self.log("checking for updates..."),
            UpdateEvent::UpdateAvailable(info) => self.prompt_download(info).await,
            UpdateEvent::UpdateNotAvailable => self.log("update not available"),
            UpdateEvent::DownloadProgress(progress) => self.forward_progress(&progress),
            UpdateEvent::UpdateDownloaded(info) => self.prompt_install(info).await,
            UpdateEvent::Error { message } => self.report_error(&message),
        }
    }

    async fn prompt_download(&self, info: UpdateInfo) {
        if !self.shell.has_window() {
            self.log(&format!(
                "update {} available but no window is open; skipping download prompt",
                info.version
            ));
            return;
        }

        self.log(&format!("update {} available", info.version));
        match self.shell.confirm(ConsentPrompt::download(&info)).await {
            Ok(ConsentChoice::Accepted) => {
                if let Err(error) = self.client.download_update().await {
                    self.log(&format!("error downloading update {}: {error}", info.version));
                }
            }
            Ok(ConsentChoice::Declined) => {
                self.log(&format!("download of update {} declined", info.version));
            }
            Err(error) => self.log(&format!("error showing update dialog: {error}")),
        }
    }

    async fn prompt_install(&self, info: UpdateInfo) {
        if !self.shell.has_window() {
            self.log(&format!(
                "update {} downloaded but no window is open; it stays staged",
                info.version
            ));
            return;
        }

        match self.shell.confirm(ConsentPrompt::install(&info)).await {
            Ok(ConsentChoice::Accepted) => {
                if let Err(error) = self.client.quit_and_install(false, true) {
                    self.log(&format!("error installing update {}: {error}", info.version));
                }
            }
            Ok(ConsentChoice::Declined) => {
                self.log(&format!(
                    "install of update {} deferred until next restart",
                    info.version
                ));
            }
            Err(error) => self.log(&format!("error showing install dialog: {error}")),
        }
    }

    fn forward_progress(&self, progress: &DownloadProgress) {
        self.log(&format!(
            "download speed: {} - downloaded {}%",
            progress.bytes_per_second, progress.percent
        ));
        if !self.shell.has_window() {
            return;
        }

        if let Err(error) = self.shell.send_progress(progress) {
            self.log(&error);
        }
    }

    fn report_error(&self, message: &str) {
        self.log(&format!("auto-updater error: {message}"));
        if self.shell.has_window() {
            self.shell.show_error_box(
                UPDATE_ERROR_TITLE,
                &format!("An error occurred while updating the application: {message}"),
            );
        }
    }

    /// Dispatches events until the channel closes or shutdown is signalled.
    /// Consent prompts run as separate tasks so progress keeps flowing while
    /// a dialog is open.
    pub(crate) async fn run(
        self,
        mut events: UnboundedReceiver<UpdateEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut consent_tasks = JoinSet::new();
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    if event.awaits_consent() {
                        let orchestrator = self.clone();
                        consent_tasks.spawn(async move { orchestrator.handle_event(event).await });
                    } else {
                        self.handle_event(event).await;
                    }
                }
                Some(_) = consent_tasks.join_next(), if !consent_tasks.is_empty() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.log("update event loop stopping on shutdown");
                        consent_tasks.abort_all();
                        return;
                    }
                }
            }
        }

        while consent_tasks.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use tokio::sync::{mpsc, watch};

    use super::*;
    use crate::test_support::{FakeAnswer, FakeClient, FakeShell, LogCapture};

    fn orchestrator(
        client: &Arc<FakeClient>,
        shell: &Arc<FakeShell>,
        logs: &LogCapture,
    ) -> UpdateOrchestrator<FakeClient, FakeShell> {
        UpdateOrchestrator::new(Arc::clone(client), Arc::clone(shell), logs.sink())
    }

    fn available(version: &str) -> UpdateEvent {
        UpdateEvent::UpdateAvailable(UpdateInfo {
            version: version.to_string(),
        })
    }

    fn downloaded(version: &str) -> UpdateEvent {
        UpdateEvent::UpdateDownloaded(UpdateInfo {
            version: version.to_string(),
        })
    }

    fn sample_progress() -> DownloadProgress {
        DownloadProgress {
            percent: 42.0,
            bytes_per_second: 1000.0,
            transferred: 420,
            total: 1000,
        }
    }

    #[tokio::test]
    async fn accepted_download_prompt_names_version_and_downloads_once() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::with_window(FakeAnswer::Choose(
            ConsentChoice::Accepted,
        )));
        let logs = LogCapture::default();

        orchestrator(&client, &shell, &logs)
            .handle_event(available("2.0.0"))
            .await;

        let prompts = shell.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].message.contains("2.0.0"));
        assert_eq!(client.downloads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn declined_download_prompt_keeps_scheduled_checks_running() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::with_window(FakeAnswer::Choose(
            ConsentChoice::Declined,
        )));
        let logs = LogCapture::default();
        let orchestrator = orchestrator(&client, &shell, &logs);

        orchestrator.handle_event(available("2.0.0")).await;
        assert_eq!(client.downloads.load(Ordering::SeqCst), 0);

        orchestrator.check_for_updates(CheckOrigin::Scheduled).await;
        assert_eq!(client.checks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn available_update_without_window_is_only_logged() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::without_window());
        let logs = LogCapture::default();

        orchestrator(&client, &shell, &logs)
            .handle_event(available("2.0.0"))
            .await;

        assert!(shell.prompts().is_empty());
        assert_eq!(client.downloads.load(Ordering::SeqCst), 0);
        assert_eq!(logs.entries().len(), 1);
    }

    #[tokio::test]
    async fn dialog_failure_is_logged_without_downloading() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::with_window(FakeAnswer::Fail(
            "no display".to_string(),
        )));
        let logs = LogCapture::default();

        orchestrator(&client, &shell, &logs)
            .handle_event(available("2.0.0"))
            .await;

        assert_eq!(client.downloads.load(Ordering::SeqCst), 0);
        assert!(logs
            .entries()
            .iter()
            .any(|entry| entry.contains("error showing update dialog: no display")));
    }

    #[tokio::test]
    async fn accepted_install_prompt_restarts_into_update_exactly_once() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::with_window(FakeAnswer::Choose(
            ConsentChoice::Accepted,
        )));
        let logs = LogCapture::default();

        orchestrator(&client, &shell, &logs)
            .handle_event(downloaded("2.0.0"))
            .await;

        assert_eq!(client.installs(), vec![(false, true)]);
        assert_eq!(shell.prompts()[0].decline_label, "Later");
    }

    #[tokio::test]
    async fn deferred_install_leaves_update_staged() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::with_window(FakeAnswer::Choose(
            ConsentChoice::Declined,
        )));
        let logs = LogCapture::default();

        orchestrator(&client, &shell, &logs)
            .handle_event(downloaded("2.0.0"))
            .await;

        assert!(client.installs().is_empty());
    }

    #[tokio::test]
    async fn progress_is_forwarded_unchanged_to_window() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::with_window(FakeAnswer::Never));
        let logs = LogCapture::default();

        orchestrator(&client, &shell, &logs)
            .handle_event(UpdateEvent::DownloadProgress(sample_progress()))
            .await;

        assert_eq!(shell.progress(), vec![sample_progress()]);
    }

    #[tokio::test]
    async fn progress_without_window_is_dropped() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::without_window());
        let logs = LogCapture::default();
        let orchestrator = orchestrator(&client, &shell, &logs);

        for _ in 0..3 {
            orchestrator
                .handle_event(UpdateEvent::DownloadProgress(sample_progress()))
                .await;
        }

        assert!(shell.progress().is_empty());
    }

    #[tokio::test]
    async fn rejected_check_is_logged_exactly_once() {
        let client = Arc::new(FakeClient::failing_checks("network unreachable"));
        let shell = Arc::new(FakeShell::without_window());
        let logs = LogCapture::default();

        orchestrator(&client, &shell, &logs)
            .check_for_updates(CheckOrigin::Startup)
            .await;

        assert_eq!(
            logs.entries(),
            vec!["error in startup update check: network unreachable".to_string()]
        );
    }

    #[tokio::test]
    async fn rejected_check_with_error_event_logs_rejection_and_error_once_each() {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (shutdown_sender, shutdown) = watch::channel(false);
        let client = Arc::new(FakeClient::failing_checks_with_events(
            "network unreachable",
            sender,
        ));
        let shell = Arc::new(FakeShell::without_window());
        let logs = LogCapture::default();
        let orchestrator = orchestrator(&client, &shell, &logs);

        let handle = tokio::spawn(orchestrator.clone().run(receiver, shutdown));
        orchestrator.check_for_updates(CheckOrigin::Startup).await;
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        shutdown_sender.send(true).expect("signal shutdown");
        handle.await.expect("event loop task");

        let entries = logs.entries();
        let count = |needle: &str| entries.iter().filter(|entry| entry.contains(needle)).count();
        assert_eq!(count("error in startup update check: network unreachable"), 1);
        assert_eq!(count("auto-updater error: network unreachable"), 1);
        assert!(shell.errors().is_empty());
    }

    #[tokio::test]
    async fn client_error_shows_error_box_only_with_window() {
        let client = Arc::new(FakeClient::default());
        let with_window = Arc::new(FakeShell::with_window(FakeAnswer::Never));
        let without_window = Arc::new(FakeShell::without_window());
        let logs = LogCapture::default();
        let error = UpdateEvent::Error {
            message: "signature mismatch".to_string(),
        };

        orchestrator(&client, &with_window, &logs)
            .handle_event(error.clone())
            .await;
        orchestrator(&client, &without_window, &logs)
            .handle_event(error)
            .await;

        assert_eq!(
            with_window.errors(),
            vec![(
                "Update Error".to_string(),
                "An error occurred while updating the application: signature mismatch".to_string()
            )]
        );
        assert!(without_window.errors().is_empty());
        assert_eq!(logs.entries().len(), 2);
    }

    #[tokio::test]
    async fn run_dispatches_events_until_channel_closes() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::with_window(FakeAnswer::Choose(
            ConsentChoice::Accepted,
        )));
        let logs = LogCapture::default();
        let (sender, receiver) = mpsc::unbounded_channel();
        let (_shutdown_sender, shutdown) = watch::channel(false);

        sender
            .send(UpdateEvent::CheckingForUpdate)
            .expect("send checking");
        sender.send(available("2.0.0")).expect("send available");
        sender
            .send(UpdateEvent::DownloadProgress(sample_progress()))
            .expect("send progress");
        drop(sender);

        orchestrator(&client, &shell, &logs)
            .run(receiver, shutdown)
            .await;

        assert_eq!(client.downloads.load(Ordering::SeqCst), 1);
        assert_eq!(shell.progress().len(), 1);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_even_with_open_dialog() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::with_window(FakeAnswer::Never));
        let logs = LogCapture::default();
        let (sender, receiver) = mpsc::unbounded_channel();
        let (shutdown_sender, shutdown) = watch::channel(false);

        let handle = tokio::spawn(orchestrator(&client, &shell, &logs).run(receiver, shutdown));
        sender.send(available("2.0.0")).expect("send available");
        tokio::task::yield_now().await;
        shutdown_sender.send(true).expect("signal shutdown");

        handle.await.expect("event loop task");
        assert_eq!(client.downloads.load(Ordering::SeqCst), 0);
        assert!(logs
            .entries()
            .iter()
            .any(|entry| entry.contains("stopping on shutdown")));
    }

    #[tokio::test]
    async fn run_keeps_forwarding_progress_while_dialog_is_open() {
        let client = Arc::new(FakeClient::default());
        let shell = Arc::new(FakeShell::with_window(FakeAnswer::Never));
        let logs = LogCapture::default();
        let (sender, receiver) = mpsc::unbounded_channel();
        let (shutdown_sender, shutdown) = watch::channel(false);

        let handle = tokio::spawn(orchestrator(&client, &shell, &logs).run(receiver, shutdown));
        sender.send(available("2.0.0")).expect("send available");
        sender
            .send(UpdateEvent::DownloadProgress(sample_progress()))
            .expect("send progress");
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }

        assert_eq!(shell.prompts().len(), 1);
        assert_eq!(shell.progress(), vec![sample_progress()]);

        shutdown_sender.send(true).expect("signal shutdown");
        handle.await.expect("event loop task");
    }
}
