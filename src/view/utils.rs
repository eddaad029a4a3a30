//! Utility functions for rendering UI components

use std::time::Duration;

use ratatui::style::{Color, Style};

const SPINNER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

pub fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()]
}

pub fn spinner_style() -> Style {
    Style::default().fg(Color::Indexed(63))
}

pub fn file_style() -> Style {
    Style::default().fg(Color::Indexed(211))
}

pub fn title_style() -> Style {
    Style::default().fg(Color::Indexed(93))
}

pub fn success_style() -> Style {
    Style::default().fg(Color::Indexed(42))
}

pub fn error_style() -> Style {
    Style::default().fg(Color::Indexed(196))
}

pub fn muted_style() -> Style {
    Style::default().fg(Color::Indexed(240))
}

/// SI byte count, e.g. `0 B`, `999 B`, `4.2 MB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["kB", "MB", "GB", "TB", "PB", "EB"];
    if bytes < 1000 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        unit = next;
    }
    if value < 10.0 {
        format!("{:.1} {}", value, unit)
    } else {
        format!("{:.0} {}", value, unit)
    }
}

/// Whole-second duration such as `45s`, `3m7s` or `1h2m0s`
pub fn format_eta(eta: Option<Duration>) -> String {
    let Some(eta) = eta else {
        return "0s".to_string();
    };
    let total = eta.as_secs_f64().round() as u64;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Cuts `s` to at most `max_width` characters, marking the cut with `…`.
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut truncated: String = s.chars().take(max_width - 1).collect();
    truncated.push('…');
    truncated
}
