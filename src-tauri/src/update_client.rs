use std::{
    future::Future,
    sync::Mutex,
    time::{Duration, Instant},
};

use tauri::AppHandle;
use tauri_plugin_updater::{Update, Updater, UpdaterExt};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    app_config::ShellConfig, DownloadProgress, UpdateEvent, UpdateInfo, PROGRESS_REPORT_INTERVAL,
};

/// Commands understood by an update client. Outcomes are published as
/// [`UpdateEvent`]s; the returned results only carry rejections.
pub(crate) trait UpdateClient: Send + Sync + 'static {
    fn check_for_updates(&self) -> impl Future<Output = Result<(), String>> + Send;

    fn download_update(&self) -> impl Future<Output = Result<(), String>> + Send;

    fn quit_and_install(&self, silent: bool, force_run_after: bool) -> Result<(), String>;
}

/// Turns raw download chunks into cumulative progress, reporting at most
/// once per `min_interval`. The first chunk and the final chunk are always
/// reported.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    started: Instant,
    min_interval: Duration,
    last_reported: Option<Instant>,
    transferred: u64,
    total: u64,
}

impl ProgressTracker {
    pub(crate) fn new(started: Instant, min_interval: Duration) -> Self {
        Self {
            started,
            min_interval,
            last_reported: None,
            transferred: 0,
            total: 0,
        }
    }

    pub(crate) fn record_chunk(
        &mut self,
        chunk_len: usize,
        content_length: Option<u64>,
        now: Instant,
    ) -> Option<DownloadProgress> {
        self.transferred = self.transferred.saturating_add(chunk_len as u64);
        if let Some(content_length) = content_length {
            self.total = content_length;
        }

        let complete = self.total > 0 && self.transferred >= self.total;
        let due = self
            .last_reported
            .is_none_or(|last| now.saturating_duration_since(last) >= self.min_interval);
        if !complete && !due {
            return None;
        }
        self.last_reported = Some(now);

        let percent = if self.total > 0 {
            (self.transferred as f64 / self.total as f64 * 100.0).min(100.0)
        } else {
            0.0
        };
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        let bytes_per_second = if elapsed > 0.0 {
            self.transferred as f64 / elapsed
        } else {
            self.transferred as f64
        };

        Some(DownloadProgress {
            percent,
            bytes_per_second,
            transferred: self.transferred,
            total: self.total,
        })
    }
}

struct StagedUpdate {
    update: Update,
    bytes: Vec<u8>,
}

pub(crate) struct TauriUpdateClient {
    app_handle: AppHandle,
    config: ShellConfig,
    events: UnboundedSender<UpdateEvent>,
    pending: Mutex<Option<Update>>,
    staged: Mutex<Option<StagedUpdate>>,
}

impl TauriUpdateClient {
    pub(crate) fn new(
        app_handle: AppHandle,
        config: ShellConfig,
        events: UnboundedSender<UpdateEvent>,
    ) -> Self {
        Self {
            app_handle,
            config,
            events,
            pending: Mutex::new(None),
            staged: Mutex::new(None),
        }
    }

    fn emit(&self, event: UpdateEvent) {
        // The receiver only goes away during shutdown.
        let _ = self.events.send(event);
    }

    fn fail(&self, message: String) -> String {
        self.emit(UpdateEvent::Error {
            message: message.clone(),
        });
        message
    }

    fn build_updater(&self) -> Result<Updater, String> {
        let mut builder = self.app_handle.updater_builder();
        if !self.config.updater_endpoints.is_empty() {
            builder = builder
                .endpoints(self.config.updater_endpoints.clone())
                .map_err(|error| format!("Invalid updater endpoints: {error}"))?;
        }
        if let Some(pubkey) = &self.config.updater_pubkey {
            builder = builder.pubkey(pubkey.clone());
        }
        builder
            .build()
            .map_err(|error| format!("Failed to initialize updater: {error}"))
    }

    fn take_pending(&self) -> Option<Update> {
        self.pending.lock().ok().and_then(|mut guard| guard.take())
    }

    fn take_staged(&self) -> Option<StagedUpdate> {
        self.staged.lock().ok().and_then(|mut guard| guard.take())
    }

    /// Installs an update that was downloaded but deferred, without
    /// relaunching. Runs from the exit sequence.
    pub(crate) fn install_staged_on_exit<F>(&self, log: F)
    where
        F: Fn(&str),
    {
        let Some(staged) = self.take_staged() else {
            return;
        };

        let version = staged.update.version.clone();
        log(&format!("installing deferred update {version} on exit"));
        if let Err(error) = staged.update.install(&staged.bytes) {
            log(&format!("failed to install deferred update {version}: {error}"));
        }
    }
}

impl UpdateClient for TauriUpdateClient {
    async fn check_for_updates(&self) -> Result<(), String> {
        self.emit(UpdateEvent::CheckingForUpdate);
        let updater = self.build_updater().map_err(|error| self.fail(error))?;

        match updater.check().await {
            Ok(Some(update)) => {
                let info = UpdateInfo {
                    version: update.version.clone(),
                };
                if let Ok(mut guard) = self.pending.lock() {
                    *guard = Some(update);
                }
                self.emit(UpdateEvent::UpdateAvailable(info));
                Ok(())
            }
            Ok(None) => {
                self.emit(UpdateEvent::UpdateNotAvailable);
                Ok(())
            }
            Err(error) => Err(self.fail(format!("Failed to check for updates: {error}"))),
        }
    }

    async fn download_update(&self) -> Result<(), String> {
        let Some(update) = self.take_pending() else {
            return Err(self.fail("No update is available for download.".to_string()));
        };

        let version = update.version.clone();
        let events = self.events.clone();
        let mut tracker = ProgressTracker::new(Instant::now(), PROGRESS_REPORT_INTERVAL);
        let bytes = update
            .download(
                move |chunk_len, content_length| {
                    if let Some(progress) =
                        tracker.record_chunk(chunk_len, content_length, Instant::now())
                    {
                        let _ = events.send(UpdateEvent::DownloadProgress(progress));
                    }
                },
                || {},
            )
            .await
            .map_err(|error| self.fail(format!("Failed to download update {version}: {error}")))?;

        if let Ok(mut guard) = self.staged.lock() {
            *guard = Some(StagedUpdate { update, bytes });
        }
        self.emit(UpdateEvent::UpdateDownloaded(UpdateInfo { version }));
        Ok(())
    }

    fn quit_and_install(&self, silent: bool, force_run_after: bool) -> Result<(), String> {
        let Some(staged) = self.take_staged() else {
            return Err(self.fail("No downloaded update is ready to install.".to_string()));
        };

        let version = staged.update.version.clone();
        crate::append_update_log(&format!(
            "installing update {version} (silent={silent}, force_run_after={force_run_after})"
        ));
        staged
            .update
            .install(&staged.bytes)
            .map_err(|error| self.fail(format!("Failed to install update {version}: {error}")))?;

        if force_run_after {
            self.app_handle.request_restart();
        } else {
            self.app_handle.exit(0);
        }
        Ok(())
    }
}
