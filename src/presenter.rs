use tracing::{debug, warn};

use crate::domain::AppConfig;
use crate::lookup::LookupIndex;
use crate::normalizer::{RawValue, display_string, normalize, normalize_identifier};
use crate::store::RecordStore;

pub const NOT_FOUND_TEXT: &str = "client not found";

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDisplay {
    pub field: String,
    pub value: String,
}

/// Turns a selected client name into the strings shown in the field panel.
pub struct Presenter {
    store: RecordStore,
    index: LookupIndex,
    identifier_column: String,
    identifier_width: usize,
    display: Vec<FieldDisplay>,
}

impl Presenter {
    pub fn new(store: RecordStore, config: &AppConfig) -> Self {
        for field in config.fields.iter() {
            if !store.columns().contains(field) {
                warn!("Column {field:?} is missing, it will always show empty");
            }
        }
        let index = LookupIndex::build(&store, &config.name_column);
        let display = config
            .fields
            .iter()
            .map(|f| FieldDisplay {
                field: f.clone(),
                value: String::new(),
            })
            .collect();
        Self {
            store,
            index,
            identifier_column: config.identifier_column.clone(),
            identifier_width: config.identifier_width,
            display,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn index(&self) -> &LookupIndex {
        &self.index
    }

    pub fn fields(&self) -> &[FieldDisplay] {
        &self.display
    }

    pub fn field_value(&self, idx: usize) -> Option<&FieldDisplay> {
        self.display.get(idx)
    }

    pub fn clear(&mut self) {
        for f in self.display.iter_mut() {
            f.value.clear();
        }
    }

    pub fn on_select(&mut self, name: &str) -> &[FieldDisplay] {
        self.clear();

        let name = name.trim();
        if name.is_empty() {
            return &self.display;
        }

        let Some(row) = self.index.find(name).and_then(|idx| self.store.row(idx)) else {
            debug!("No client named {name:?}");
            for f in self.display.iter_mut() {
                f.value = NOT_FOUND_TEXT.to_string();
            }
            return &self.display;
        };

        debug!("Selected client {name:?}");
        for f in self.display.iter_mut() {
            let raw = row.get(&f.field).cloned().unwrap_or(RawValue::Empty);
            let mut value = normalize(&raw);
            if f.field == self.identifier_column {
                value = RawValue::Text(normalize_identifier(&value, self.identifier_width));
            }
            f.value = display_string(&value);
        }
        &self.display
    }

    /// Clears the panel when the typed text is not exactly one of the known names.
    pub fn on_keystroke(&mut self, typed: &str) -> bool {
        if self.index.contains_folded(typed) {
            false
        } else {
            self.clear();
            true
        }
    }
}
