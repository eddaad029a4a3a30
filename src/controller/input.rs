//! Key event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::AppState;
use super::AppController;
use super::events::Task;

impl AppController {
    pub(crate) fn handle_key_event(&mut self, key: KeyEvent) -> Vec<Task> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }

        // Global cancel, valid in every state
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if key.code == KeyCode::Esc || (ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))) {
            self.quit();
            return Vec::new();
        }

        // The prompt only takes input while no search is running
        if *self.model.state() != AppState::AwaitingQuery || self.model.is_searching() {
            return Vec::new();
        }

        match key.code {
            KeyCode::Enter => self.submit_query(),
            KeyCode::Backspace => {
                self.model.backspace_input();
                Vec::new()
            }
            KeyCode::Char('u') if ctrl => {
                self.model.clear_input();
                Vec::new()
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.model.append_to_input(c);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use crate::controller::AppEvent;
    use crate::model::AppModel;

    fn ready() -> AppController {
        let mut c = AppController::new(AppModel::new(80), "p=");
        c.handle_event(AppEvent::DependenciesVerified(Ok(())));
        c
    }

    #[test]
    fn release_events_are_ignored() {
        let mut c = ready();
        let release = KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        c.handle_key_event(release);
        assert_eq!(c.model().input(), "");
    }

    #[test]
    fn shifted_characters_are_typed() {
        let mut c = ready();
        c.handle_key_event(KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT));
        assert_eq!(c.model().input(), "D");
    }

    #[test]
    fn ctrl_u_clears_the_prompt() {
        let mut c = ready();
        c.handle_key_event(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        c.handle_key_event(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(c.model().input(), "");
        assert!(c.model().termination().is_none());
    }
}
