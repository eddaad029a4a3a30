//! Main application model with state management
//!
//! Owned by the event loop and mutated only by the controller.

use super::types::{AppState, Notice, ProgressSnapshot, SelectedItem, Termination};

/// Fraction of the remaining distance the gauge covers per tick
const GAUGE_EASING: f64 = 0.35;

#[derive(Clone, Debug)]
pub struct AppModel {
    state: AppState,
    input: String,
    /// Query of the search currently in flight
    pending_query: Option<String>,
    items: Vec<SelectedItem>,
    last_progress: Option<ProgressSnapshot>,
    gauge_target: f64,
    gauge_percent: f64,
    spinner_frame: usize,
    width: u16,
    notices: Vec<Notice>,
}

impl AppModel {
    pub fn new(width: u16) -> Self {
        Self {
            state: AppState::InstallingDependencies,
            input: String::new(),
            pending_query: None,
            items: Vec::new(),
            last_progress: None,
            gauge_target: 0.0,
            gauge_percent: 0.0,
            spinner_frame: 0,
            width,
            notices: Vec::new(),
        }
    }

    // ========================================================================
    // Phase
    // ========================================================================

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn set_state(&mut self, state: AppState) {
        tracing::debug!(from = ?self.state, to = ?state, "State transition");
        self.state = state;
    }

    pub fn terminate(&mut self, termination: Termination) {
        self.set_state(AppState::Terminal(termination));
    }

    pub fn termination(&self) -> Option<&Termination> {
        match &self.state {
            AppState::Terminal(termination) => Some(termination),
            _ => None,
        }
    }

    // ========================================================================
    // Query input
    // ========================================================================

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn append_to_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace_input(&mut self) {
        self.input.pop();
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    pub fn pending_query(&self) -> Option<&str> {
        self.pending_query.as_deref()
    }

    pub fn set_pending_query(&mut self, query: Option<String>) {
        self.pending_query = query;
    }

    pub fn is_searching(&self) -> bool {
        self.pending_query.is_some()
    }

    // ========================================================================
    // Download
    // ========================================================================

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<SelectedItem>) {
        self.items = items;
    }

    pub fn last_progress(&self) -> Option<&ProgressSnapshot> {
        self.last_progress.as_ref()
    }

    /// Retains `snapshot` as the only progress record and retargets the gauge.
    pub fn update_progress(&mut self, snapshot: ProgressSnapshot) {
        let target = snapshot.percent.clamp(0.0, 100.0);
        // A new file starts over; jump back instead of easing backwards.
        if target < self.gauge_target {
            self.gauge_percent = target;
        }
        self.gauge_target = target;
        self.last_progress = Some(snapshot);
    }

    /// Percent currently drawn by the gauge
    pub fn gauge_percent(&self) -> f64 {
        self.gauge_percent
    }

    // ========================================================================
    // Animation & layout
    // ========================================================================

    pub fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);

        let remaining = self.gauge_target - self.gauge_percent;
        self.gauge_percent = if remaining.abs() < 0.5 {
            self.gauge_target
        } else {
            self.gauge_percent + remaining * GAUGE_EASING
        };
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner_frame
    }

    pub fn resize(&mut self, width: u16) {
        self.width = width;
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    // ========================================================================
    // Printed lines
    // ========================================================================

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
