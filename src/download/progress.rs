//! Decoding of the downloader's progress lines and emission throttling
//!
//! The downloader is asked to print one JSON object per progress hook call,
//! prefixed with [`PROGRESS_PREFIX`] so the lines can be told apart from
//! anything else it writes.

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::model::{ProgressSnapshot, ProgressStatus};

pub const PROGRESS_PREFIX: &str = "[jack-progress] ";

/// Placeholder the downloader substitutes for missing template fields
const MISSING_FIELD: &str = "NA";

/// Value for `--progress-template`.
pub fn progress_template() -> String {
    format!(
        "download:{}{{\"progress\":%(progress)j,\"artist\":%(info.artists.0)j,\"title\":%(info.title)j,\"url\":%(info.webpage_url)j}}",
        PROGRESS_PREFIX
    )
}

#[derive(Debug, Deserialize)]
struct ProgressLine {
    progress: RawProgress,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProgress {
    status: Option<String>,
    downloaded_bytes: Option<f64>,
    total_bytes: Option<f64>,
    total_bytes_estimate: Option<f64>,
    eta: Option<f64>,
    filename: Option<String>,
}

/// Decodes one stdout line. Returns `None` for lines that are not progress
/// reports or whose payload cannot be read.
pub fn parse_progress_line(line: &str) -> Option<ProgressSnapshot> {
    let payload = line.trim_end().strip_prefix(PROGRESS_PREFIX)?;
    let parsed: ProgressLine = match serde_json::from_str(payload) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable progress line");
            return None;
        }
    };

    let raw = parsed.progress;
    let status = raw
        .status
        .as_deref()
        .map(ProgressStatus::parse)
        .unwrap_or(ProgressStatus::Other("unknown".to_string()));

    let downloaded_bytes = raw.downloaded_bytes.map(to_bytes).unwrap_or(0);
    let total_bytes = raw
        .total_bytes
        .or(raw.total_bytes_estimate)
        .map(to_bytes)
        .unwrap_or(0);

    Some(ProgressSnapshot {
        percent: percent_of(&status, downloaded_bytes, total_bytes),
        status,
        downloaded_bytes,
        total_bytes,
        eta: raw
            .eta
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64),
        filename: raw.filename.unwrap_or_default(),
        artist: present(parsed.artist),
        title: present(parsed.title),
        source_url: present(parsed.url),
        error_message: None,
    })
}

/// Builds the snapshot reported for an `ERROR:` line on stderr.
pub fn error_snapshot(message: &str, last: Option<&ProgressSnapshot>) -> ProgressSnapshot {
    let mut snapshot = last.cloned().unwrap_or_default();
    snapshot.status = ProgressStatus::Error;
    snapshot.error_message = Some(message.to_string());
    snapshot
}

fn percent_of(status: &ProgressStatus, downloaded: u64, total: u64) -> f64 {
    if *status == ProgressStatus::Finished {
        return 100.0;
    }
    if total == 0 {
        return 0.0;
    }
    (downloaded as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

fn to_bytes(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 { value as u64 } else { 0 }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty() && v != MISSING_FIELD)
}

/// Limits `Downloading` snapshots to one per interval. Status changes always
/// pass so that `Finished`/`Error` are never held back.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last_emit: Option<Instant>,
    last_status: Option<ProgressStatus>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_emit: None, last_status: None }
    }

    pub fn should_emit(&mut self, snapshot: &ProgressSnapshot, now: Instant) -> bool {
        let status_changed = self.last_status.as_ref() != Some(&snapshot.status);
        let due = self
            .last_emit
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);

        if status_changed || snapshot.status != ProgressStatus::Downloading || due {
            self.last_emit = Some(now);
            self.last_status = Some(snapshot.status.clone());
            true
        } else {
            false
        }
    }
}
