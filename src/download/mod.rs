//! Download driver - runs the external downloader and relays its progress
//!
//! - `progress`: progress line decoding and throttling
//! - `deps`: verification that the external tools are runnable

pub mod deps;
pub mod progress;

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::Instant;

use crate::config::DownloadConfig;
use crate::error::AppError;
use crate::model::{Outcome, ProgressSnapshot, SelectedItem};
use progress::{ProgressThrottle, error_snapshot, parse_progress_line, progress_template};

/// Runs a download of `items` to completion on the calling thread.
///
/// `on_progress` is called from that same thread for every emitted snapshot
/// and may block; the driver simply waits.
pub trait Downloader: Send + Sync {
    fn download(
        &self,
        items: &[SelectedItem],
        on_progress: &mut dyn FnMut(ProgressSnapshot),
    ) -> Outcome;
}

enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Drives `yt-dlp` as a child process
#[derive(Clone, Debug)]
pub struct YtDlpDownloader {
    config: DownloadConfig,
}

impl YtDlpDownloader {
    pub fn new(config: DownloadConfig) -> Self {
        Self { config }
    }

    pub fn args(&self, urls: &[&str]) -> Vec<String> {
        let mut args = self.config.extra_args.clone();
        args.extend(
            [
                "--format",
                self.config.format.as_str(),
                "--remux-video",
                self.config.remux.as_str(),
                "--output",
                self.config.output_template.as_str(),
                "--quiet",
                "--progress",
                "--newline",
            ]
            .iter()
            .map(|arg| arg.to_string()),
        );
        args.push("--progress-template".to_string());
        args.push(progress_template());
        args.extend(urls.iter().map(|url| url.to_string()));
        args
    }
}

impl Downloader for YtDlpDownloader {
    fn download(
        &self,
        items: &[SelectedItem],
        on_progress: &mut dyn FnMut(ProgressSnapshot),
    ) -> Outcome {
        if items.is_empty() {
            tracing::info!("Nothing selected, skipping download");
            return Outcome::success();
        }

        let urls: Vec<&str> = items.iter().map(|item| item.resolved_url.as_str()).collect();
        tracing::info!(program = %self.config.program, ?urls, "Starting download");

        let mut child = match Command::new(&self.config.program)
            .args(self.args(&urls))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(error = %e, "Failed to start downloader");
                return Outcome::failure(AppError::Download(format!(
                    "failed to start {}: {}",
                    self.config.program, e
                )));
            }
        };

        let (sender, receiver) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, sender.clone(), OutputLine::Stdout);
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, sender.clone(), OutputLine::Stderr);
        }
        drop(sender);

        let mut throttle = ProgressThrottle::new(self.config.progress_interval);
        let mut last: Option<ProgressSnapshot> = None;
        let mut held_back = false;
        let mut last_error: Option<String> = None;

        // Ends once both pipes are closed
        for line in receiver {
            let snapshot = match line {
                OutputLine::Stdout(text) => match parse_progress_line(&text) {
                    Some(snapshot) => snapshot,
                    None => {
                        tracing::trace!(line = %text, "downloader output");
                        continue;
                    }
                },
                OutputLine::Stderr(text) => {
                    let Some(message) = text.strip_prefix("ERROR:") else {
                        tracing::debug!(line = %text, "downloader stderr");
                        continue;
                    };
                    let message = message.trim().to_string();
                    tracing::error!(error = %message, "Downloader reported an error");
                    let snapshot = error_snapshot(&message, last.as_ref());
                    last_error = Some(message);
                    snapshot
                }
            };

            if throttle.should_emit(&snapshot, Instant::now()) {
                on_progress(snapshot.clone());
                held_back = false;
            } else {
                held_back = true;
            }
            last = Some(snapshot);
        }

        // The last downloading snapshot may have been throttled away.
        if held_back {
            if let Some(snapshot) = last.clone() {
                on_progress(snapshot);
            }
        }

        match child.wait() {
            Ok(status) if status.success() => {
                tracing::info!("Download finished");
                Outcome::success()
            }
            Ok(status) => {
                let reason = last_error.unwrap_or_else(|| match status.code() {
                    Some(code) => format!("{} exited with status {}", self.config.program, code),
                    None => format!("{} was terminated by a signal", self.config.program),
                });
                tracing::error!(%reason, "Download failed");
                Outcome::failure(AppError::Download(reason))
            }
            Err(e) => Outcome::failure(AppError::Download(e.to_string())),
        }
    }
}

/// Pumps `reader` line by line into `sender` on a helper thread.
///
/// Invalid UTF-8 is replaced rather than ending the pump, so the child never
/// writes into a closed pipe.
fn forward_lines<R, F>(reader: R, sender: mpsc::Sender<OutputLine>, wrap: F)
where
    R: Read + Send + 'static,
    F: Fn(String) -> OutputLine + Send + 'static,
{
    std::thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read downloader output");
                    break;
                }
            }
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']).to_string();
            if sender.send(wrap(line)).is_err() {
                break;
            }
        }
    });
}
