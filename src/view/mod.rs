//! View module - UI rendering
//!
//! Pure rendering from the model to a frame of the inline live area, using
//! ratatui. It is organized into submodules by component type:
//!
//! - `utils`: Shared helpers (spinner, styles, byte/eta formatting)
//! - `progress`: The download status line

mod utils;
mod progress;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::model::{AppModel, AppState, Notice, NoticeKind, Termination};
use utils::{error_style, muted_style, spinner, spinner_style, success_style, title_style};

const INPUT_PROMPT: &str = "> ";
const INPUT_PLACEHOLDER: &str = "Enter your search query";

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, model: &AppModel) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(1)
            .constraints([
                Constraint::Length(1), // Main line
                Constraint::Length(1),
                Constraint::Length(1), // Key hint
                Constraint::Min(0),
            ])
            .split(frame.area());

        match model.state() {
            AppState::InstallingDependencies => {
                render_spinner_line(frame, chunks[0], model, "installing dependencies...");
            }
            AppState::AwaitingQuery if model.is_searching() => {
                render_spinner_line(frame, chunks[0], model, "searching...");
            }
            AppState::AwaitingQuery => {
                render_input(frame, chunks[0], model);
                frame.render_widget(
                    Paragraph::new(Span::styled("(esc to quit)", muted_style())),
                    chunks[2],
                );
            }
            AppState::Downloading => match model.last_progress() {
                Some(snapshot) => progress::render_download_line(frame, chunks[0], model, snapshot),
                None => {
                    let message = match model.items().first() {
                        Some(item) => format!("fetching {} - {}...", item.artist, item.title),
                        None => "fetching...".to_string(),
                    };
                    render_spinner_line(frame, chunks[0], model, &message);
                }
            },
            AppState::Terminal(_) => {
                if let Some(message) = final_message(model) {
                    frame.render_widget(Paragraph::new(message), chunks[0]);
                }
            }
        }
    }
}

/// Line left on screen after the run ends, if any
pub fn final_message(model: &AppModel) -> Option<String> {
    match model.termination()? {
        Termination::Success { items } => Some(format!("downloaded {} items.", items)),
        Termination::Quit | Termination::Failed(_) => None,
    }
}

/// Styled line for a notice printed above the live area
pub fn notice_line(notice: &Notice) -> Line<'static> {
    let (mark, style) = match notice.kind {
        NoticeKind::Success => ("✓", success_style()),
        NoticeKind::Error => ("✗", error_style()),
    };
    Line::from(vec![
        Span::styled(mark, style),
        Span::raw(" "),
        Span::raw(notice.text.clone()),
    ])
}

fn render_spinner_line(frame: &mut Frame, area: Rect, model: &AppModel, message: &str) {
    let line = Line::from(vec![
        Span::styled(spinner(model.spinner_frame()), spinner_style()),
        Span::raw(" "),
        Span::raw(message.to_string()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(frame: &mut Frame, area: Rect, model: &AppModel) {
    let input = model.input();
    let text = if input.is_empty() {
        Span::styled(INPUT_PLACEHOLDER, muted_style())
    } else {
        Span::styled(input.to_string(), title_style())
    };
    frame.render_widget(Paragraph::new(Line::from(vec![Span::raw(INPUT_PROMPT), text])), area);

    frame.set_cursor_position((cursor_column(area, input), area.y));
}

/// Column just past the typed text, in display cells, kept inside `area`
fn cursor_column(area: Rect, input: &str) -> u16 {
    let typed = Span::raw(INPUT_PROMPT).width() + Span::raw(input).width();
    let offset = u16::try_from(typed).unwrap_or(u16::MAX);
    area.x
        .saturating_add(offset)
        .min(area.right().saturating_sub(1))
}
