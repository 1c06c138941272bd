use std::time::Duration;
use tracing::trace;

use crate::domain::{AppConfig, CCError, Message};
use crate::model::{Model, Modus};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, CCError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(key, model.modus()));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent, modus: Modus) -> Option<Message> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Message::Quit);
        }

        let message = match modus {
            Modus::SEARCH => match key.code {
                KeyCode::Up => Some(Message::MoveUp),
                KeyCode::Down => Some(Message::MoveDown),
                KeyCode::Enter => Some(Message::Select),
                KeyCode::Tab => Some(Message::ToggleFocus),
                KeyCode::Esc => Some(Message::Exit),
                KeyCode::F(1) => Some(Message::Help),
                _ => Some(Message::RawKey(key)),
            },
            Modus::FIELDS => match key.code {
                KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
                KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
                KeyCode::Enter | KeyCode::Char('c') | KeyCode::Char('y') => {
                    Some(Message::CopyField)
                }
                KeyCode::Char(c @ '1'..='9') => c
                    .to_digit(10)
                    .map(|d| Message::CopyFieldAt(d as usize - 1)),
                KeyCode::Tab | KeyCode::BackTab => Some(Message::ToggleFocus),
                KeyCode::Esc => Some(Message::Exit),
                KeyCode::Char('?') | KeyCode::F(1) => Some(Message::Help),
                KeyCode::Char('q') => Some(Message::Quit),
                _ => None,
            },
            Modus::POPUP => match key.code {
                KeyCode::Esc | KeyCode::Enter => Some(Message::Exit),
                _ => None,
            },
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
