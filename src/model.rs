use ratatui::crossterm::event::KeyEvent;
use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

use crate::clipboard::ClipboardSink;
use crate::domain::{AppConfig, CCError, HELP_TEXT, Message};
use crate::inputter::{InputResult, Inputter};
use crate::presenter::{FieldDisplay, NOT_FOUND_TEXT, Presenter};
use crate::store::RecordStore;

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modus {
    SEARCH,
    FIELDS,
    POPUP,
}

/// Everything the UI needs to render one frame.
pub struct UIData {
    pub name: String,
    pub nrecords: usize,
    pub names: Vec<String>,
    pub selected_name: Option<usize>,
    pub fields: Vec<FieldDisplay>,
    pub selected_field: usize,
    pub modus: Modus,
    pub search: InputResult,
    pub show_popup: bool,
    pub popup_title: String,
    pub popup_message: String,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            nrecords: 0,
            names: Vec::new(),
            selected_name: None,
            fields: Vec::new(),
            selected_field: 0,
            modus: Modus::SEARCH,
            search: InputResult::default(),
            show_popup: false,
            popup_title: String::new(),
            popup_message: String::new(),
            status_message: String::new(),
        }
    }
}

pub struct Model {
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    presenter: Presenter,
    clipboard: Box<dyn ClipboardSink>,
    input: Inputter,
    last_input: InputResult,
    matches: Vec<String>, // Display names matching the search text
    list_curser: usize,
    field_curser: usize,
    popup_title: String,
    popup_message: String,
    status_message: String,
    data_path: PathBuf,
    uidata: UIData,
}

impl Model {
    pub fn init(config: &AppConfig, store: RecordStore, clipboard: Box<dyn ClipboardSink>) -> Self {
        let data_path = store.path().to_path_buf();
        let status_message = if store.is_empty() {
            "No client records found".to_string()
        } else {
            format!("Loaded {} records", store.len())
        };
        let presenter = Presenter::new(store, config);
        let matches = presenter.index().display_names().to_vec();
        let mut model = Self {
            status: Status::READY,
            modus: Modus::SEARCH,
            previous_modus: Modus::SEARCH,
            presenter,
            clipboard,
            input: Inputter::default(),
            last_input: InputResult::default(),
            matches,
            list_curser: 0,
            field_curser: 0,
            popup_title: String::new(),
            popup_message: String::new(),
            status_message,
            data_path,
            uidata: UIData::empty(),
        };
        model.update_uidata();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn modus(&self) -> Modus {
        self.modus
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), CCError> {
        if let Some(msg) = message {
            match self.modus {
                Modus::SEARCH => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveUp => self.move_list_selection_up(),
                    Message::MoveDown => self.move_list_selection_down(),
                    Message::Select => self.select(),
                    Message::ToggleFocus => self.modus = Modus::FIELDS,
                    Message::Exit => self.exit(),
                    Message::Help => self.show_help(),
                    Message::RawKey(key) => self.raw_input(key),
                    _ => (),
                },
                Modus::FIELDS => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveUp => self.field_curser = self.field_curser.saturating_sub(1),
                    Message::MoveDown => self.move_field_selection_down(),
                    Message::CopyField => self.copy_field(self.field_curser),
                    Message::CopyFieldAt(idx) => self.copy_field(idx),
                    Message::ToggleFocus | Message::Exit => self.modus = Modus::SEARCH,
                    Message::Help => self.show_help(),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Select => self.exit(),
                    _ => (),
                },
            }
        }

        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn exit(&mut self) {
        match self.modus {
            Modus::SEARCH => {
                if self.input.is_empty() {
                    self.quit();
                } else {
                    self.input.clear();
                    self.after_edit();
                }
            }
            Modus::FIELDS => self.modus = Modus::SEARCH,
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
            }
        }
    }

    fn show_popup(&mut self, title: &str, message: String) {
        if self.modus != Modus::POPUP {
            self.previous_modus = self.modus;
        }
        self.modus = Modus::POPUP;
        self.popup_title = title.to_string();
        self.popup_message = message;
    }

    fn show_help(&mut self) {
        self.show_popup("Help", HELP_TEXT.to_string());
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        self.after_edit();
    }

    // Runs after every change of the search text.
    fn after_edit(&mut self) {
        self.last_input = self.input.get();
        self.matches = self.presenter.index().search(&self.last_input.input);
        self.list_curser = 0;
        if self.presenter.on_keystroke(&self.last_input.input) {
            trace!("{:?} is not a known client, fields cleared", self.last_input.input);
        }
    }

    fn select(&mut self) {
        let name = match self.matches.get(self.list_curser) {
            Some(name) => name.clone(),
            None => self.last_input.input.clone(),
        };

        if !self.matches.is_empty() {
            self.input.set(&name);
            self.last_input = self.input.get();
            self.matches = self.presenter.index().search(&name);
            self.list_curser = self.matches.iter().position(|n| n == &name).unwrap_or(0);
        }

        let shown = self.presenter.on_select(&name);
        let found = shown.first().is_some_and(|f| f.value != NOT_FOUND_TEXT);
        if name.trim().is_empty() {
            self.set_status_message("Nothing selected");
        } else if found {
            debug!("Showing client {name:?}");
            self.set_status_message(format!("Selected {}", name.trim()));
        } else {
            self.set_status_message(format!("Client {:?} not found", name.trim()));
        }
    }

    fn copy_field(&mut self, idx: usize) {
        let Some(field) = self.presenter.field_value(idx).cloned() else {
            self.set_status_message(format!("There is no field {}", idx + 1));
            return;
        };
        self.field_curser = idx;

        match self.clipboard.set_text(field.value.trim()) {
            Ok(()) => {
                info!("Copied field {} to clipboard.", field.field);
                self.set_status_message(format!("Copied {}", field.field));
            }
            Err(e) => {
                warn!("Error copying to clipboard: {e:?}");
                self.set_status_message("Copy failed");
                self.show_popup("Copy failed", e.to_string());
            }
        }
    }

    fn move_list_selection_up(&mut self) {
        self.list_curser = self.list_curser.saturating_sub(1);
    }

    fn move_list_selection_down(&mut self) {
        if self.list_curser + 1 < self.matches.len() {
            self.list_curser += 1;
        }
    }

    fn move_field_selection_down(&mut self) {
        if self.field_curser + 1 < self.presenter.fields().len() {
            self.field_curser += 1;
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn update_uidata(&mut self) {
        self.uidata = UIData {
            name: self
                .data_path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("???")
                .to_string(),
            nrecords: self.presenter.store().len(),
            names: self.matches.clone(),
            selected_name: if self.matches.is_empty() {
                None
            } else {
                Some(self.list_curser)
            },
            fields: self.presenter.fields().to_vec(),
            selected_field: self.field_curser,
            modus: self.modus,
            search: self.last_input.clone(),
            show_popup: self.modus == Modus::POPUP,
            popup_title: self.popup_title.clone(),
            popup_message: self.popup_message.clone(),
            status_message: self.status_message.clone(),
        };
    }
}
