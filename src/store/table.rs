use tracing::debug;

use crate::model::Record;

use super::{Error, Result};

/// Ordered in-memory collection of one record type. Identifiers are unique.
#[derive(Debug, Clone)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: vec![] }
    }
}

impl<R: Record> Table<R> {
    pub fn new(rows: Vec<R>) -> Result<Self> {
        let mut table = Table::default();
        for row in rows {
            table.insert(row)?;
        }

        Ok(table)
    }

    pub fn records(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&R> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.id() == id)
    }

    pub fn insert(&mut self, record: R) -> Result<()> {
        if self.contains(record.id()) {
            return Err(Error::AlreadyExists(record.id().to_string()));
        }

        self.rows.push(record);
        Ok(())
    }

    /// Swap in a whole record, keeping its position. Returns the previous one.
    pub fn replace(&mut self, record: R) -> Result<R> {
        match self.position(record.id()) {
            Some(pos) => Ok(std::mem::replace(&mut self.rows[pos], record)),
            None => Err(Error::NotFound(record.id().to_string())),
        }
    }

    pub fn update_field(&mut self, id: &str, field: R::Field, value: &str) -> Result<()> {
        let pos = self
            .position(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let mut updated = self.rows[pos].clone();
        updated.assign(field, value)?;
        debug!(id, %field, value, "updated field");
        self.rows[pos] = updated;

        Ok(())
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<R> {
        &mut self.rows
    }
}
