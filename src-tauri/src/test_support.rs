use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use tokio::sync::mpsc::UnboundedSender;

use crate::{
    update_client::UpdateClient, update_orchestrator::LogSink, update_shell::UpdateShell,
    ConsentChoice, ConsentPrompt, DownloadProgress, UpdateEvent,
};

#[derive(Default)]
pub(crate) struct FakeClient {
    pub(crate) checks: AtomicUsize,
    pub(crate) downloads: AtomicUsize,
    installs: Mutex<Vec<(bool, bool)>>,
    check_error: Option<String>,
    events: Option<UnboundedSender<UpdateEvent>>,
}

impl FakeClient {
    pub(crate) fn failing_checks(error: &str) -> Self {
        Self {
            check_error: Some(error.to_string()),
            ..Self::default()
        }
    }

    /// Rejects checks and also publishes an `Error` event, as the Tauri
    /// client does.
    pub(crate) fn failing_checks_with_events(
        error: &str,
        events: UnboundedSender<UpdateEvent>,
    ) -> Self {
        Self {
            events: Some(events),
            ..Self::failing_checks(error)
        }
    }

    pub(crate) fn installs(&self) -> Vec<(bool, bool)> {
        self.installs.lock().unwrap().clone()
    }
}

impl UpdateClient for FakeClient {
    async fn check_for_updates(&self) -> Result<(), String> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let Some(error) = &self.check_error else {
            return Ok(());
        };
        if let Some(events) = &self.events {
            let _ = events.send(UpdateEvent::Error {
                message: error.clone(),
            });
        }
        Err(error.clone())
    }

    async fn download_update(&self) -> Result<(), String> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn quit_and_install(&self, silent: bool, force_run_after: bool) -> Result<(), String> {
        self.installs.lock().unwrap().push((silent, force_run_after));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) enum FakeAnswer {
    Choose(ConsentChoice),
    Fail(String),
    Never,
}

pub(crate) struct FakeShell {
    window: bool,
    answer: FakeAnswer,
    prompts: Mutex<Vec<ConsentPrompt>>,
    progress: Mutex<Vec<DownloadProgress>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl FakeShell {
    pub(crate) fn with_window(answer: FakeAnswer) -> Self {
        Self {
            window: true,
            answer,
            prompts: Mutex::default(),
            progress: Mutex::default(),
            errors: Mutex::default(),
        }
    }

    pub(crate) fn without_window() -> Self {
        Self {
            window: false,
            ..Self::with_window(FakeAnswer::Never)
        }
    }

    pub(crate) fn prompts(&self) -> Vec<ConsentPrompt> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn progress(&self) -> Vec<DownloadProgress> {
        self.progress.lock().unwrap().clone()
    }

    pub(crate) fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().unwrap().clone()
    }
}

impl UpdateShell for FakeShell {
    fn has_window(&self) -> bool {
        self.window
    }

    fn send_progress(&self, progress: &DownloadProgress) -> Result<(), String> {
        self.progress.lock().unwrap().push(progress.clone());
        Ok(())
    }

    async fn confirm(&self, prompt: ConsentPrompt) -> Result<ConsentChoice, String> {
        self.prompts.lock().unwrap().push(prompt);
        match self.answer.clone() {
            FakeAnswer::Choose(choice) => Ok(choice),
            FakeAnswer::Fail(error) => Err(error),
            FakeAnswer::Never => std::future::pending().await,
        }
    }

    fn show_error_box(&self, title: &str, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
    }
}

#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    entries: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    pub(crate) fn sink(&self) -> LogSink {
        let entries = Arc::clone(&self.entries);
        Arc::new(move |message: &str| entries.lock().unwrap().push(message.to_string()))
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}
