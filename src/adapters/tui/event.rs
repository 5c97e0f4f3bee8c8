use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Keys reduced to what the screens care about. Letters stay as
/// `Character` because their meaning depends on whether a text field has
/// focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Quit,
    Character(char),
    Backspace,
    Enter,
    Escape,
    Tab,
    BackTab,
    Up,
    Down,
    Tick,
}

#[derive(Debug)]
pub struct EventHandler {
    poll_interval: Duration,
    should_quit: bool,
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

impl EventHandler {
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Waits up to the poll interval for input; returns `Tick` when idle so
    /// the caller can pick up background state changes.
    pub async fn next_event(&mut self) -> Result<AppEvent> {
        let poll_interval = self.poll_interval;
        let ready = tokio::task::block_in_place(|| event::poll(poll_interval))?;
        if !ready {
            return Ok(AppEvent::Tick);
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => Ok(self.map_key(key)),
            _ => Ok(AppEvent::Tick),
        }
    }

    fn map_key(&mut self, key: KeyEvent) -> AppEvent {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                AppEvent::Quit
            }
            (KeyCode::Char(c), KeyModifiers::NONE) => AppEvent::Character(c),
            (KeyCode::Char(c), KeyModifiers::SHIFT) => {
                AppEvent::Character(c.to_uppercase().next().unwrap_or(c))
            }
            (KeyCode::Backspace, _) => AppEvent::Backspace,
            (KeyCode::Enter, _) => AppEvent::Enter,
            (KeyCode::Esc, _) => AppEvent::Escape,
            (KeyCode::Tab, KeyModifiers::NONE) => AppEvent::Tab,
            (KeyCode::BackTab, _) => AppEvent::BackTab,
            (KeyCode::Up, _) => AppEvent::Up,
            (KeyCode::Down, _) => AppEvent::Down,
            _ => AppEvent::Tick,
        }
    }
}
