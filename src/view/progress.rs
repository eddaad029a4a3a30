//! Download status line rendering
//!
//! `<spinner> <status> <file> <gap> <gauge> [eta: <eta>] [size: <size>]`

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{LineGauge, Paragraph},
    Frame,
};

use crate::model::{AppModel, ProgressSnapshot};
use super::utils::{
    file_style, format_bytes, format_eta, muted_style, spinner, spinner_style, success_style,
    truncate_string,
};

const GAUGE_WIDTH: u16 = 40;

/// Everything on the line except the file name
struct Segments {
    head: String,
    gauge: u16,
    tail: Vec<Span<'static>>,
    tail_width: u16,
}

fn segments(model: &AppModel, snapshot: &ProgressSnapshot) -> Segments {
    let head = format!("{} {} ", spinner(model.spinner_frame()), snapshot.status.as_str());
    let eta = format_eta(snapshot.eta);
    let size = format_bytes(snapshot.total_bytes);
    let tail = vec![
        Span::raw(" [eta: "),
        Span::styled(format!("{:>4}", eta), muted_style()),
        Span::raw("] [size: "),
        Span::styled(size, muted_style()),
        Span::raw("]"),
    ];
    let tail_width = tail.iter().map(|s| s.width() as u16).sum();
    let gauge = GAUGE_WIDTH.min(model.width() / 3);
    Segments { head, gauge, tail, tail_width }
}

/// Room left for the file name at the model's current width
pub fn file_width(model: &AppModel, snapshot: &ProgressSnapshot) -> usize {
    let s = segments(model, snapshot);
    let used = s.head.chars().count() as u16 + s.gauge + s.tail_width;
    model.width().saturating_sub(used) as usize
}

pub fn render_download_line(frame: &mut Frame, area: Rect, model: &AppModel, snapshot: &ProgressSnapshot) {
    let file = truncate_string(&snapshot.filename, file_width(model, snapshot));
    let s = segments(model, snapshot);

    let head_width = (s.head.chars().count() + file.chars().count()) as u16;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(head_width),
            Constraint::Min(0), // Gap
            Constraint::Length(s.gauge),
            Constraint::Length(s.tail_width),
        ])
        .split(area);

    let (spin, status) = s.head.split_once(' ').unwrap_or((s.head.as_str(), ""));
    let head = Line::from(vec![
        Span::styled(spin.to_string(), spinner_style()),
        Span::raw(format!(" {}", status)),
        Span::styled(file, file_style()),
    ]);
    frame.render_widget(Paragraph::new(head), chunks[0]);

    let ratio = (model.gauge_percent() / 100.0).clamp(0.0, 1.0);
    let gauge = LineGauge::default()
        .filled_style(success_style())
        .unfilled_style(muted_style())
        .ratio(ratio)
        .label(format!("{:>3.0}%", ratio * 100.0));
    frame.render_widget(gauge, chunks[2]);

    frame.render_widget(Paragraph::new(Line::from(s.tail)), chunks[3]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressStatus;
    use ratatui::{backend::TestBackend, Terminal};

    fn snapshot(filename: &str) -> ProgressSnapshot {
        ProgressSnapshot {
            status: ProgressStatus::Downloading,
            percent: 50.0,
            total_bytes: 4_200_000,
            filename: filename.into(),
            ..ProgressSnapshot::default()
        }
    }

    #[test]
    fn file_name_gets_the_leftover_width() {
        let narrow = AppModel::new(60);
        let wide = AppModel::new(160);
        let s = snapshot("Daft Punk - Discovery.webm");
        assert!(file_width(&narrow, &s) < file_width(&wide, &s));
        assert_eq!(file_width(&AppModel::new(10), &s), 0);
    }

    #[test]
    fn renders_status_file_and_size() {
        let mut model = AppModel::new(120);
        let s = snapshot("Daft Punk - Discovery.webm");
        model.update_progress(s.clone());

        let mut terminal = Terminal::new(TestBackend::new(120, 1)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render_download_line(f, area, &model, &s);
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("downloading Daft Punk - Discovery.webm"));
        assert!(text.contains("[size: 4.2 MB]"));
    }
}
