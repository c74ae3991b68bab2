use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UpdateInfo {
    pub(crate) version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DownloadProgress {
    pub(crate) percent: f64,
    pub(crate) bytes_per_second: f64,
    pub(crate) transferred: u64,
    pub(crate) total: u64,
}

/// Lifecycle events published by an update client.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UpdateEvent {
    CheckingForUpdate,
    UpdateAvailable(UpdateInfo),
    UpdateNotAvailable,
    DownloadProgress(DownloadProgress),
    UpdateDownloaded(UpdateInfo),
    Error { message: String },
}

impl UpdateEvent {
    /// Events whose handling waits on the user.
    pub(crate) fn awaits_consent(&self) -> bool {
        matches!(
            self,
            UpdateEvent::UpdateAvailable(_) | UpdateEvent::UpdateDownloaded(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CheckOrigin {
    Startup,
    Scheduled,
    Manual,
}

impl CheckOrigin {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            CheckOrigin::Startup => "startup update check",
            CheckOrigin::Scheduled => "scheduled update check",
            CheckOrigin::Manual => "manual update check",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConsentPrompt {
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) accept_label: &'static str,
    pub(crate) decline_label: &'static str,
}

impl ConsentPrompt {
    pub(crate) fn download(info: &UpdateInfo) -> Self {
        Self {
            title: "Update Available".to_string(),
            message: format!(
                "Version {} is available. Would you like to download it now?",
                info.version
            ),
            accept_label: "Yes",
            decline_label: "No",
        }
    }

    pub(crate) fn install(info: &UpdateInfo) -> Self {
        Self {
            title: "Update Ready".to_string(),
            message: format!(
                "Version {} has been downloaded. Would you like to install it now?",
                info.version
            ),
            accept_label: "Yes",
            decline_label: "Later",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConsentChoice {
    Accepted,
    Declined,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct BridgeResult {
    pub(crate) ok: bool,
    pub(crate) reason: Option<String>,
}

impl BridgeResult {
    pub(crate) fn ok() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub(crate) fn failed(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }
}
