//! Core type definitions for the application

use std::time::Duration;

use crate::error::AppError;

/// Top-level phase of a run. Only moves forward; any failure jumps to
/// `Terminal(Termination::Failed)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppState {
    InstallingDependencies,
    AwaitingQuery,
    Downloading,
    Terminal(Termination),
}

impl AppState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppState::Terminal(_))
    }
}

/// How a run ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// User pressed Ctrl-C or Escape
    Quit,
    Success { items: usize },
    Failed(AppError),
}

impl Termination {
    pub fn exit_code(&self) -> i32 {
        match self {
            Termination::Quit | Termination::Success { .. } => 0,
            Termination::Failed(_) => 1,
        }
    }
}

/// One album/EP found on a results shelf
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchResult {
    pub artist: String,
    pub album: String,
    pub playlist_id: String,
}

/// A search result promoted for download
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedItem {
    pub title: String,
    pub artist: String,
    pub resolved_url: String,
}

impl SelectedItem {
    pub fn from_result(result: &SearchResult, url_prefix: &str) -> Self {
        Self {
            title: result.album.clone(),
            artist: result.artist.clone(),
            resolved_url: format!("{}{}", url_prefix, result.playlist_id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ProgressStatus {
    /// No snapshot received yet
    #[default]
    Starting,
    Downloading,
    Finished,
    Error,
    /// Any status string the downloader reports that we don't model
    Other(String),
}

impl ProgressStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "downloading" => ProgressStatus::Downloading,
            "finished" => ProgressStatus::Finished,
            "error" => ProgressStatus::Error,
            other => ProgressStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ProgressStatus::Starting => "starting",
            ProgressStatus::Downloading => "downloading",
            ProgressStatus::Finished => "finished",
            ProgressStatus::Error => "error",
            ProgressStatus::Other(raw) => raw,
        }
    }
}

/// Point-in-time report of an in-flight download
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub status: ProgressStatus,
    /// Always within `0.0..=100.0`
    pub percent: f64,
    pub downloaded_bytes: u64,
    pub total_bytes: u64,
    pub eta: Option<Duration>,
    pub filename: String,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub source_url: Option<String>,
    /// Downloader message behind an `Error` status
    pub error_message: Option<String>,
}

/// Terminal result of the download phase
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub succeeded: bool,
    pub error: Option<AppError>,
}

impl Outcome {
    pub fn success() -> Self {
        Self { succeeded: true, error: None }
    }

    pub fn failure(error: AppError) -> Self {
        Self { succeeded: false, error: Some(error) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A line printed above the live area; it stays in the scrollback after exit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into() }
    }
}
