use std::collections::{BTreeSet, HashSet};

use crate::normalizer::{RawValue, normalize};
use crate::store::RecordStore;

/// Shown in the client list in place of a blank name.
pub const BLANK_NAME_SENTINEL: &str = "(no name)";

/// Maps display names back to rows of the record store.
#[derive(Debug, Default)]
pub struct LookupIndex {
    keys: Vec<String>, // Trimmed name per store row, same order as the store
    display_names: Vec<String>,
    folded_names: HashSet<String>,
}

impl LookupIndex {
    pub fn build(store: &RecordStore, name_column: &str) -> Self {
        let keys: Vec<String> = store
            .rows()
            .iter()
            .map(|row| {
                let raw = row.get(name_column).cloned().unwrap_or(RawValue::Empty);
                normalize(&raw).to_string().trim().to_string()
            })
            .collect();

        let display_names: Vec<String> = keys
            .iter()
            .map(|k| {
                if k.is_empty() {
                    BLANK_NAME_SENTINEL.to_string()
                } else {
                    k.clone()
                }
            })
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();

        let folded_names = display_names
            .iter()
            .map(|n| n.trim().to_lowercase())
            .collect();

        Self {
            keys,
            display_names,
            folded_names,
        }
    }

    /// Row index of the first record whose trimmed name equals `selected`.
    pub fn find(&self, selected: &str) -> Option<usize> {
        let selected = selected.trim();
        let wanted = if selected == BLANK_NAME_SENTINEL {
            ""
        } else {
            selected
        };
        self.keys.iter().position(|k| k == wanted)
    }

    /// Sorted, unique names for the selection list.
    pub fn display_names(&self) -> &[String] {
        &self.display_names
    }

    pub fn contains_folded(&self, text: &str) -> bool {
        self.folded_names.contains(&text.trim().to_lowercase())
    }

    /// Display names containing `term`, ignoring case. An empty term matches all.
    pub fn search(&self, term: &str) -> Vec<String> {
        let term = term.trim().to_lowercase();
        self.display_names
            .iter()
            .filter(|n| term.is_empty() || n.to_lowercase().contains(&term))
            .cloned()
            .collect()
    }
}
