//! Controller module - Application logic and event handling
//!
//! This module contains the state machine that owns the model, routes every
//! incoming event to a transition and returns the background work to start
//! next. It is organized into submodules by responsibility:
//!
//! - `events`: The closed event and task types
//! - `bridge`: Progress relay between the download thread and the loop
//! - `input`: Key event handling
//! - `runtime`: Spawning of tasks and the terminal input reader

mod bridge;
mod events;
mod input;
pub mod runtime;

pub use bridge::{ProgressListener, progress_bridge};
pub use events::{AppEvent, Task};

use crate::error::AppError;
use crate::model::{
    AppModel, AppState, Notice, Outcome, ProgressSnapshot, ProgressStatus, SearchResult,
    SelectedItem, Termination,
};

/// Number of search results promoted to a download
const MAX_SELECTED_ITEMS: usize = 1;

pub struct AppController {
    model: AppModel,
    playlist_url_prefix: String,
}

impl AppController {
    pub fn new(model: AppModel, playlist_url_prefix: impl Into<String>) -> Self {
        Self {
            model,
            playlist_url_prefix: playlist_url_prefix.into(),
        }
    }

    pub fn model(&self) -> &AppModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut AppModel {
        &mut self.model
    }

    /// Work to start before the first event arrives.
    pub fn init(&self) -> Vec<Task> {
        vec![Task::VerifyDependencies]
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Vec<Task> {
        if self.model.state().is_terminal() {
            tracing::trace!(?event, "Discarding event after termination");
            return Vec::new();
        }

        match event {
            AppEvent::Key(key) => self.handle_key_event(key),
            AppEvent::Resize { width } => {
                self.model.resize(width);
                Vec::new()
            }
            AppEvent::Tick => {
                self.model.tick();
                Vec::new()
            }
            AppEvent::DependenciesVerified(result) => self.on_dependencies_verified(result),
            AppEvent::SearchCompleted(result) => self.on_search_completed(result),
            AppEvent::Progress { snapshot, listener } => self.on_progress(snapshot, listener),
            AppEvent::DownloadFinished(outcome) => self.on_download_finished(outcome),
        }
    }

    fn on_dependencies_verified(&mut self, result: Result<(), AppError>) -> Vec<Task> {
        if *self.model.state() != AppState::InstallingDependencies {
            tracing::warn!("Unexpected dependency check result");
            return Vec::new();
        }
        match result {
            Ok(()) => {
                tracing::info!("Dependencies verified, awaiting query");
                self.model.set_state(AppState::AwaitingQuery);
            }
            Err(e) => self.fail(e),
        }
        Vec::new()
    }

    /// Validates the typed query and starts the search.
    pub(crate) fn submit_query(&mut self) -> Vec<Task> {
        let query = self.model.input().trim().to_string();
        if query.is_empty() {
            self.report(&AppError::EmptyQuery);
            return Vec::new();
        }

        tracing::info!(query = %query, "Submitting search");
        self.model.set_pending_query(Some(query.clone()));
        vec![Task::Search(query)]
    }

    fn on_search_completed(&mut self, result: Result<Vec<SearchResult>, AppError>) -> Vec<Task> {
        let Some(query) = self.model.pending_query().map(str::to_string) else {
            tracing::warn!("Search result arrived with no search in flight");
            return Vec::new();
        };
        self.model.set_pending_query(None);

        let results = match result {
            Ok(results) => results,
            Err(e) if e.is_recoverable() => {
                self.report(&e);
                return Vec::new();
            }
            Err(e) => {
                self.fail(e);
                return Vec::new();
            }
        };

        let items: Vec<SelectedItem> = results
            .iter()
            .take(MAX_SELECTED_ITEMS)
            .map(|result| SelectedItem::from_result(result, &self.playlist_url_prefix))
            .collect();

        if items.is_empty() {
            self.fail(AppError::NoResults(query));
            return Vec::new();
        }

        tracing::info!(
            found = results.len(),
            selected = ?items.iter().map(|i| format!("{} - {}", i.artist, i.title)).collect::<Vec<_>>(),
            "Starting download"
        );

        self.model.set_items(items.clone());
        self.model.set_state(AppState::Downloading);

        let (publisher, listener) = progress_bridge();
        vec![
            Task::Download { items, publisher },
            Task::ListenProgress(listener),
        ]
    }

    fn on_progress(&mut self, snapshot: ProgressSnapshot, listener: ProgressListener) -> Vec<Task> {
        if *self.model.state() != AppState::Downloading {
            tracing::warn!("Progress outside of a download, ignoring");
            return Vec::new();
        }

        tracing::trace!(status = snapshot.status.as_str(), percent = snapshot.percent, "Progress");

        match snapshot.status {
            ProgressStatus::Finished => {
                let notice = self.finished_notice(&snapshot);
                self.model.push_notice(notice);
            }
            ProgressStatus::Error => {
                let source = snapshot
                    .source_url
                    .as_deref()
                    .or(snapshot.error_message.as_deref())
                    .unwrap_or("unknown source");
                self.model.push_notice(Notice::error(format!("error downloading: {}", source)));
            }
            _ => {}
        }

        self.model.update_progress(snapshot);
        vec![Task::ListenProgress(listener)]
    }

    fn finished_notice(&self, snapshot: &ProgressSnapshot) -> Notice {
        let item = self.model.items().first();
        let artist = snapshot
            .artist
            .as_deref()
            .or(item.map(|i| i.artist.as_str()))
            .unwrap_or("unknown artist");
        let title = snapshot
            .title
            .as_deref()
            .or(item.map(|i| i.title.as_str()))
            .unwrap_or("unknown title");
        Notice::success(format!("downloaded {} - {} ({})", artist, title, snapshot.filename))
    }

    fn on_download_finished(&mut self, outcome: Outcome) -> Vec<Task> {
        if *self.model.state() != AppState::Downloading {
            tracing::warn!("Download outcome outside of a download, ignoring");
            return Vec::new();
        }

        match outcome {
            Outcome { succeeded: true, .. } => {
                let items = self.model.items().len();
                tracing::info!(items, "All downloads finished");
                self.model.terminate(Termination::Success { items });
            }
            Outcome { error, .. } => {
                let error = error.unwrap_or_else(|| AppError::Download("download failed".to_string()));
                self.fail(error);
            }
        }
        Vec::new()
    }

    pub(crate) fn quit(&mut self) {
        tracing::info!("Quit requested");
        self.model.terminate(Termination::Quit);
    }

    /// Queues the error line without leaving the current state.
    fn report(&mut self, error: &AppError) {
        tracing::warn!(error = %error, "Recoverable error");
        self.model.push_notice(Notice::error(format!("{}: {}", error.context(), error)));
    }

    fn fail(&mut self, error: AppError) {
        tracing::error!(error = %error, context = error.context(), "Fatal error");
        self.model.push_notice(Notice::error(format!("{}: {}", error.context(), error)));
        self.model.terminate(Termination::Failed(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use crate::config::PLAYLIST_URL_PREFIX;
    use crate::model::NoticeKind;

    fn controller() -> AppController {
        AppController::new(AppModel::new(80), PLAYLIST_URL_PREFIX)
    }

    fn awaiting_query() -> AppController {
        let mut c = controller();
        c.handle_event(AppEvent::DependenciesVerified(Ok(())));
        c
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(c: &mut AppController, text: &str) {
        for ch in text.chars() {
            c.handle_event(key(KeyCode::Char(ch)));
        }
    }

    fn daft_punk() -> SearchResult {
        SearchResult {
            artist: "Daft Punk".into(),
            album: "Discovery".into(),
            playlist_id: "PL123".into(),
        }
    }

    /// Drives a controller into `Downloading` and returns the relay listener.
    fn downloading() -> (AppController, ProgressListener) {
        let mut c = awaiting_query();
        type_text(&mut c, "Daft Punk");
        c.handle_event(key(KeyCode::Enter));
        let tasks = c.handle_event(AppEvent::SearchCompleted(Ok(vec![daft_punk()])));
        let listener = tasks
            .into_iter()
            .find_map(|t| match t {
                Task::ListenProgress(l) => Some(l),
                _ => None,
            })
            .unwrap();
        (c, listener)
    }

    fn progress(status: ProgressStatus, percent: f64) -> ProgressSnapshot {
        ProgressSnapshot {
            status,
            percent,
            filename: "Daft Punk - Discovery.opus".into(),
            ..ProgressSnapshot::default()
        }
    }

    #[test]
    fn starts_by_verifying_dependencies() {
        let c = controller();
        assert_eq!(*c.model().state(), AppState::InstallingDependencies);
        assert!(matches!(c.init().as_slice(), [Task::VerifyDependencies]));
    }

    #[test]
    fn verified_dependencies_focus_the_prompt() {
        let c = awaiting_query();
        assert_eq!(*c.model().state(), AppState::AwaitingQuery);
    }

    #[test]
    fn dependency_failure_is_fatal() {
        let mut c = controller();
        c.handle_event(AppEvent::DependenciesVerified(Err(AppError::DependencyInstall(
            "yt-dlp is not available".into(),
        ))));
        assert!(matches!(
            c.model().termination(),
            Some(Termination::Failed(AppError::DependencyInstall(_)))
        ));
        let notices = c.model_mut().take_notices();
        assert_eq!(notices[0].kind, NoticeKind::Error);
        assert!(notices[0].text.starts_with("error installing/verifying tools: "));
    }

    #[test]
    fn typing_is_ignored_until_prompt_is_ready() {
        let mut c = controller();
        type_text(&mut c, "abc");
        assert_eq!(c.model().input(), "");

        let mut c = awaiting_query();
        type_text(&mut c, "abc");
        c.handle_event(key(KeyCode::Backspace));
        assert_eq!(c.model().input(), "ab");
    }

    #[test]
    fn submit_starts_one_search() {
        let mut c = awaiting_query();
        type_text(&mut c, " Daft Punk ");
        let tasks = c.handle_event(key(KeyCode::Enter));

        assert!(matches!(tasks.as_slice(), [Task::Search(q)] if q == "Daft Punk"));
        assert!(c.model().is_searching());

        // A second Enter while the search is in flight does nothing.
        assert!(c.handle_event(key(KeyCode::Enter)).is_empty());
        type_text(&mut c, "x");
        assert_eq!(c.model().input(), " Daft Punk ");
    }

    #[test]
    fn empty_query_reprompts_without_searching() {
        let mut c = awaiting_query();
        type_text(&mut c, "   ");
        let tasks = c.handle_event(key(KeyCode::Enter));

        assert!(tasks.is_empty());
        assert_eq!(*c.model().state(), AppState::AwaitingQuery);
        assert!(!c.model().is_searching());
        let notices = c.model_mut().take_notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].text.contains("No query provided"));
    }

    #[test]
    fn search_error_is_fatal() {
        let mut c = awaiting_query();
        type_text(&mut c, "Daft Punk");
        c.handle_event(key(KeyCode::Enter));
        c.handle_event(AppEvent::SearchCompleted(Err(AppError::Transport("HTTP 503".into()))));

        assert_eq!(
            c.model().termination(),
            Some(&Termination::Failed(AppError::Transport("HTTP 503".into())))
        );
        assert_eq!(c.model().termination().map(Termination::exit_code), Some(1));
    }

    #[test]
    fn zero_results_end_in_error() {
        let mut c = awaiting_query();
        type_text(&mut c, "zzzz");
        c.handle_event(key(KeyCode::Enter));
        let tasks = c.handle_event(AppEvent::SearchCompleted(Ok(Vec::new())));

        assert!(tasks.is_empty());
        assert_eq!(
            c.model().termination(),
            Some(&Termination::Failed(AppError::NoResults("zzzz".into())))
        );
    }

    #[test]
    fn only_first_result_is_downloaded() {
        let mut c = awaiting_query();
        type_text(&mut c, "Daft Punk");
        c.handle_event(key(KeyCode::Enter));
        let second = SearchResult { album: "Homework".into(), playlist_id: "PL456".into(), ..daft_punk() };
        let tasks = c.handle_event(AppEvent::SearchCompleted(Ok(vec![daft_punk(), second])));

        assert_eq!(*c.model().state(), AppState::Downloading);
        assert_eq!(tasks.len(), 2);
        let Task::Download { items, .. } = &tasks[0] else {
            panic!("expected download task first");
        };
        assert_eq!(
            items,
            &vec![SelectedItem {
                title: "Discovery".into(),
                artist: "Daft Punk".into(),
                resolved_url: "https://music.youtube.com/playlist?list=PL123".into(),
            }]
        );
        assert!(matches!(tasks[1], Task::ListenProgress(_)));
    }

    #[test]
    fn progress_updates_snapshot_and_reissues_listen() {
        let (mut c, listener) = downloading();
        let tasks = c.handle_event(AppEvent::Progress {
            snapshot: progress(ProgressStatus::Downloading, 42.0),
            listener,
        });

        assert!(matches!(tasks.as_slice(), [Task::ListenProgress(_)]));
        assert_eq!(c.model().last_progress().map(|p| p.percent), Some(42.0));
        assert!(c.model_mut().take_notices().is_empty());
    }

    #[test]
    fn finished_and_error_snapshots_print_lines() {
        let (mut c, listener) = downloading();
        let mut finished = progress(ProgressStatus::Finished, 100.0);
        finished.artist = Some("Daft Punk".into());
        finished.title = Some("One More Time".into());
        let tasks = c.handle_event(AppEvent::Progress { snapshot: finished, listener });
        let Some(Task::ListenProgress(listener)) = tasks.into_iter().next() else {
            panic!("listen not reissued");
        };

        let mut failed = progress(ProgressStatus::Error, 0.0);
        failed.source_url = Some("https://music.youtube.com/watch?v=x".into());
        c.handle_event(AppEvent::Progress { snapshot: failed, listener });

        let notices = c.model_mut().take_notices();
        assert_eq!(
            notices,
            vec![
                Notice::success("downloaded Daft Punk - One More Time (Daft Punk - Discovery.opus)"),
                Notice::error("error downloading: https://music.youtube.com/watch?v=x"),
            ]
        );
        assert_eq!(*c.model().state(), AppState::Downloading);
    }

    #[test]
    fn error_without_url_names_the_downloader_message() {
        let (mut c, listener) = downloading();
        let mut failed = progress(ProgressStatus::Error, 0.0);
        failed.error_message = Some("[youtube] abc: Video unavailable".into());
        c.handle_event(AppEvent::Progress { snapshot: failed, listener });

        assert_eq!(
            c.model_mut().take_notices(),
            vec![Notice::error("error downloading: [youtube] abc: Video unavailable")]
        );
    }

    #[test]
    fn unknown_status_still_updates_percent() {
        let (mut c, listener) = downloading();
        c.handle_event(AppEvent::Progress {
            snapshot: progress(ProgressStatus::Other("post_process".into()), 55.0),
            listener,
        });
        assert_eq!(c.model().last_progress().map(|p| p.percent), Some(55.0));
        assert!(c.model_mut().take_notices().is_empty());
    }

    #[test]
    fn download_outcome_ends_the_run() {
        let (mut c, _listener) = downloading();
        c.handle_event(AppEvent::DownloadFinished(Outcome::success()));
        assert_eq!(c.model().termination(), Some(&Termination::Success { items: 1 }));

        let (mut c, _listener) = downloading();
        c.handle_event(AppEvent::DownloadFinished(Outcome::failure(AppError::Download(
            "exit 1".into(),
        ))));
        assert_eq!(
            c.model().termination(),
            Some(&Termination::Failed(AppError::Download("exit 1".into())))
        );
    }

    #[test]
    fn cancel_works_in_every_state() {
        for code in [KeyCode::Esc, KeyCode::Char('c')] {
            let modifiers = if code == KeyCode::Esc { KeyModifiers::NONE } else { KeyModifiers::CONTROL };
            let cancel = || AppEvent::Key(KeyEvent::new(code, modifiers));

            let mut c = controller();
            c.handle_event(cancel());
            assert_eq!(c.model().termination(), Some(&Termination::Quit));

            let (mut c, _listener) = downloading();
            c.handle_event(cancel());
            assert_eq!(c.model().termination(), Some(&Termination::Quit));
        }
    }

    #[test]
    fn events_after_termination_are_discarded() {
        let (mut c, listener) = downloading();
        c.handle_event(key(KeyCode::Esc));

        let tasks = c.handle_event(AppEvent::Progress {
            snapshot: progress(ProgressStatus::Finished, 100.0),
            listener,
        });
        c.handle_event(AppEvent::DownloadFinished(Outcome::success()));

        assert!(tasks.is_empty());
        assert!(c.model().last_progress().is_none());
        assert_eq!(c.model().termination(), Some(&Termination::Quit));
    }

    #[test]
    fn late_search_result_after_cancel_is_discarded() {
        let mut c = awaiting_query();
        type_text(&mut c, "Daft Punk");
        let tasks = c.handle_event(key(KeyCode::Enter));
        assert!(matches!(tasks.as_slice(), [Task::Search(_)]));
        assert!(c.model().is_searching());

        c.handle_event(key(KeyCode::Esc));
        let tasks = c.handle_event(AppEvent::SearchCompleted(Ok(vec![daft_punk()])));
        let failed = c.handle_event(AppEvent::SearchCompleted(Err(AppError::Transport("HTTP 503".into()))));

        assert!(tasks.is_empty());
        assert!(failed.is_empty());
        assert!(c.model().items().is_empty());
        assert!(c.model_mut().take_notices().is_empty());
        assert_eq!(c.model().termination(), Some(&Termination::Quit));
    }

    #[test]
    fn resize_only_touches_layout() {
        let mut c = awaiting_query();
        c.handle_event(AppEvent::Resize { width: 120 });
        assert_eq!(c.model().width(), 120);
        assert_eq!(*c.model().state(), AppState::AwaitingQuery);
    }

    #[test]
    fn daft_punk_end_to_end() {
        let mut c = awaiting_query();
        type_text(&mut c, "Daft Punk");
        c.handle_event(key(KeyCode::Enter));
        let tasks = c.handle_event(AppEvent::SearchCompleted(Ok(vec![daft_punk()])));

        let mut tasks = tasks.into_iter();
        let Some(Task::Download { items, publisher }) = tasks.next() else {
            panic!("expected download");
        };
        let Some(Task::ListenProgress(listener)) = tasks.next() else {
            panic!("expected listen");
        };
        assert_eq!(items[0].resolved_url, "https://music.youtube.com/playlist?list=PL123");

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let producer = std::thread::spawn(move || {
            publisher.publish(progress(ProgressStatus::Finished, 100.0));
            publisher.finish(Outcome::success());
        });

        let mut next = Some(listener);
        while let Some(listener) = next.take() {
            let event = runtime.block_on(listener.listen());
            for task in c.handle_event(event) {
                if let Task::ListenProgress(l) = task {
                    next = Some(l);
                }
            }
        }
        producer.join().unwrap();

        assert_eq!(c.model().termination(), Some(&Termination::Success { items: 1 }));
        assert_eq!(
            crate::view::final_message(c.model()).as_deref(),
            Some("downloaded 1 items.")
        );
        let notices = c.model_mut().take_notices();
        assert_eq!(
            notices,
            vec![Notice::success("downloaded Daft Punk - Discovery (Daft Punk - Discovery.opus)")]
        );
    }
}
