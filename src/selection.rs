use std::collections::BTreeSet;

use crate::model::Record;
use crate::store::Table;

/// Identifiers picked from the visible view for a bulk operation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn toggle(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
    }

    /// "All selected" deselects everything, anything else selects exactly
    /// the view.
    pub fn toggle_all<R: Record>(&mut self, view: &[&R]) {
        if !view.is_empty() && self.ids.len() == view.len() {
            self.ids.clear();
            return;
        }

        self.ids = view.iter().map(|r| r.id().to_string()).collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop identifiers whose records are gone from `table`.
    pub fn retain_existing<R: Record>(&mut self, table: &Table<R>) {
        self.ids.retain(|id| table.contains(id));
    }
}
