mod config;
mod controller;
mod download;
mod error;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::Result;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use ratatui::{
    backend::CrosstermBackend,
    widgets::{Paragraph, Widget},
    Terminal, TerminalOptions, Viewport,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use config::Config;
use controller::{AppController, AppEvent};
use controller::runtime::{self, TaskRunner};
use download::YtDlpDownloader;
use download::deps::SystemDependencyCheck;
use error::AppError;
use model::{AppModel, SearchClient, Termination};
use view::AppView;

#[tokio::main]
async fn main() -> Result<()> {
    let log_guard = match logging::init_logging() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== jack starting ===");

    let config = Config::default();
    let search = SearchClient::new(config.search.clone())?;
    let downloader = Arc::new(YtDlpDownloader::new(config.download.clone()));
    let dependencies = Arc::new(SystemDependencyCheck::new(&config.download));

    let (width, _) = terminal::size()?;
    enable_raw_mode()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::with_options(
        backend,
        TerminalOptions {
            viewport: Viewport::Inline(config.viewport_height),
        },
    )?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let runner = TaskRunner::new(events_tx.clone(), search, downloader, dependencies);
    runtime::spawn_input_reader(events_tx, config.tick_interval);

    let controller = AppController::new(
        AppModel::new(width),
        config.playlist_url_prefix.clone(),
    );

    let res = run_app(&mut terminal, controller, &runner, events_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.show_cursor()?;
    println!();

    let termination = match res {
        Ok(termination) => termination,
        Err(err) => {
            tracing::error!(error = ?err, "Application error");
            let err = AppError::from(err);
            eprintln!("{}: {}", err.context(), err);
            Termination::Failed(err)
        }
    };

    let code = termination.exit_code();
    tracing::info!(code, ?termination, "jack shutting down");
    drop(log_guard);

    // Background download threads are not joined on the way out.
    std::process::exit(code);
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut controller: AppController,
    runner: &TaskRunner,
    mut events: UnboundedReceiver<AppEvent>,
) -> io::Result<Termination> {
    for task in controller.init() {
        runner.spawn(task);
    }

    loop {
        // Lines queued by the controller go above the live area
        for notice in controller.model_mut().take_notices() {
            let line = view::notice_line(&notice);
            terminal.insert_before(1, |buf| {
                let area = buf.area;
                Paragraph::new(line).render(area, buf);
            })?;
        }

        terminal.draw(|f| {
            AppView::render(f, controller.model());
        })?;

        if let Some(termination) = controller.model().termination() {
            return Ok(termination.clone());
        }

        let Some(event) = events.recv().await else {
            return Ok(Termination::Failed(AppError::Terminal(
                "event channel closed".to_string(),
            )));
        };

        for task in controller.handle_event(event) {
            runner.spawn(task);
        }
    }
}
