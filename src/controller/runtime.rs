//! Execution of controller tasks and the terminal input reader
//!
//! Every task runs off the event loop and reports back with exactly one
//! `AppEvent` on the loop's channel.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use tokio::sync::mpsc::UnboundedSender;

use crate::download::Downloader;
use crate::download::deps::DependencyCheck;
use crate::model::SearchClient;
use super::events::{AppEvent, Task};

#[derive(Clone)]
pub struct TaskRunner {
    events: UnboundedSender<AppEvent>,
    search: SearchClient,
    downloader: Arc<dyn Downloader>,
    dependencies: Arc<dyn DependencyCheck>,
}

impl TaskRunner {
    pub fn new(
        events: UnboundedSender<AppEvent>,
        search: SearchClient,
        downloader: Arc<dyn Downloader>,
        dependencies: Arc<dyn DependencyCheck>,
    ) -> Self {
        Self { events, search, downloader, dependencies }
    }

    pub fn spawn(&self, task: Task) {
        let events = self.events.clone();
        match task {
            Task::VerifyDependencies => {
                let dependencies = self.dependencies.clone();
                tokio::task::spawn_blocking(move || {
                    let result = dependencies.verify().map(|tools| {
                        tracing::debug!(count = tools.len(), "Dependency check complete");
                    });
                    send(&events, AppEvent::DependenciesVerified(result));
                });
            }
            Task::Search(query) => {
                let search = self.search.clone();
                tokio::spawn(async move {
                    let result = search.search(&query).await;
                    send(&events, AppEvent::SearchCompleted(result));
                });
            }
            Task::Download { items, publisher } => {
                let downloader = self.downloader.clone();
                tokio::task::spawn_blocking(move || {
                    let outcome = downloader.download(&items, &mut |snapshot| {
                        if !publisher.publish(snapshot) {
                            tracing::trace!("Progress dropped, event loop stopped");
                        }
                    });
                    publisher.finish(outcome);
                });
            }
            Task::ListenProgress(listener) => {
                tokio::spawn(async move {
                    send(&events, listener.listen().await);
                });
            }
        }
    }
}

fn send(events: &UnboundedSender<AppEvent>, event: AppEvent) {
    if events.send(event).is_err() {
        tracing::debug!("Event loop stopped, dropping event");
    }
}

/// Reads terminal events on a dedicated thread and emits a `Tick` every
/// `tick_interval`. Stops when the loop side of the channel is closed.
pub fn spawn_input_reader(events: UnboundedSender<AppEvent>, tick_interval: Duration) {
    std::thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            let timeout = tick_interval.saturating_sub(last_tick.elapsed());
            let event = match event::poll(timeout) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => Some(AppEvent::Key(key)),
                    Ok(Event::Resize(width, _)) => Some(AppEvent::Resize { width }),
                    Ok(_) => None,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => None,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to poll terminal events");
                    break;
                }
            };

            if let Some(event) = event {
                if events.send(event).is_err() {
                    break;
                }
            }
            if last_tick.elapsed() >= tick_interval {
                last_tick = Instant::now();
                if events.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        }
        tracing::debug!("Input reader stopped");
    });
}
