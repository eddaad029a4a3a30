//! Everything that flows into and out of the controller

use crossterm::event::KeyEvent;

use crate::error::AppError;
use crate::model::{Outcome, ProgressSnapshot, SearchResult, SelectedItem};
use super::bridge::{ProgressListener, ProgressPublisher};

/// Input to the state machine. Background work reports back only through
/// these values.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize { width: u16 },
    Tick,
    DependenciesVerified(Result<(), AppError>),
    SearchCompleted(Result<Vec<SearchResult>, AppError>),
    /// One snapshot popped off the relay; `listener` has to be handed back in
    /// a `Task::ListenProgress` to receive the next one.
    Progress {
        snapshot: ProgressSnapshot,
        listener: ProgressListener,
    },
    DownloadFinished(Outcome),
}

/// Asynchronous operation requested by the controller
#[derive(Debug)]
pub enum Task {
    VerifyDependencies,
    Search(String),
    Download {
        items: Vec<SelectedItem>,
        publisher: ProgressPublisher,
    },
    ListenProgress(ProgressListener),
}
