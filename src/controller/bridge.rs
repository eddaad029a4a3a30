//! Single-slot relay between the download thread and the event loop
//!
//! The driver thread publishes snapshots with a blocking send; with a
//! capacity of one the publisher stalls until the loop has taken the previous
//! snapshot. The loop pulls exactly one message per `listen` call and has to
//! reissue the listen after handling it. The download outcome is the last
//! message on the relay, so it can never overtake a snapshot.

use tokio::sync::mpsc;

use crate::error::AppError;
use crate::model::{Outcome, ProgressSnapshot};
use super::events::AppEvent;

#[derive(Debug)]
enum Relay {
    Snapshot(ProgressSnapshot),
    Finished(Outcome),
}

/// Creates a connected publisher/listener pair.
pub fn progress_bridge() -> (ProgressPublisher, ProgressListener) {
    let (sender, receiver) = mpsc::channel(1);
    (ProgressPublisher { sender }, ProgressListener { receiver })
}

/// Producer half, used from the download thread
#[derive(Debug)]
pub struct ProgressPublisher {
    sender: mpsc::Sender<Relay>,
}

impl ProgressPublisher {
    /// Blocks until the slot is free. Returns `false` once the loop side is
    /// gone, after which snapshots are dropped.
    ///
    /// Must not be called from inside the async runtime.
    pub fn publish(&self, snapshot: ProgressSnapshot) -> bool {
        self.sender.blocking_send(Relay::Snapshot(snapshot)).is_ok()
    }

    pub fn finish(self, outcome: Outcome) {
        if self.sender.blocking_send(Relay::Finished(outcome)).is_err() {
            tracing::debug!("Download outcome dropped, event loop already stopped");
        }
    }
}

/// Consumer half, moved into each listen operation and handed back with the
/// event it produced
#[derive(Debug)]
pub struct ProgressListener {
    receiver: mpsc::Receiver<Relay>,
}

impl ProgressListener {
    /// Waits for the next relay message and turns it into one event.
    pub async fn listen(mut self) -> AppEvent {
        match self.receiver.recv().await {
            Some(Relay::Snapshot(snapshot)) => AppEvent::Progress { snapshot, listener: self },
            Some(Relay::Finished(outcome)) => AppEvent::DownloadFinished(outcome),
            None => AppEvent::DownloadFinished(Outcome::failure(AppError::Download(
                "download worker stopped without reporting a result".to_string(),
            ))),
        }
    }
}
