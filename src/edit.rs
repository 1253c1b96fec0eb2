use std::fmt::Display;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState {
    Display,
    Editing { draft: String },
    Committing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Input arrived while the cell was not editing.
    Ignored,
    Committed,
    /// The draft matched the current value, nothing was written.
    Unchanged,
    Reverted,
    /// The update callback refused the draft; the cell stays in editing.
    Rejected(String),
}

/// Single-field editor: shows a value, switches to a draft on focus, commits
/// on Enter or blur and reverts on Escape.
#[derive(Debug, Clone)]
pub struct EditCell {
    value: String,
    state: CellState,
    error: Option<String>,
}

impl EditCell {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self {
            value: value.into(),
            state: CellState::Display,
            error: None,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn focus(&mut self) {
        if self.state == CellState::Display {
            self.state = CellState::Editing {
                draft: self.value.clone(),
            };
        }
    }

    pub fn set_draft<S: Into<String>>(&mut self, text: S) {
        if let CellState::Editing { draft } = &mut self.state {
            *draft = text.into();
        }
    }

    pub fn key<C, E>(&mut self, key: Key, commit: C) -> Outcome
    where
        C: FnOnce(&str) -> Result<(), E>,
        E: Display,
    {
        match key {
            Key::Enter => self.commit(commit),
            Key::Escape => match self.state {
                CellState::Editing { .. } => {
                    self.state = CellState::Display;
                    self.error = None;
                    Outcome::Reverted
                }
                _ => Outcome::Ignored,
            },
        }
    }

    pub fn blur<C, E>(&mut self, commit: C) -> Outcome
    where
        C: FnOnce(&str) -> Result<(), E>,
        E: Display,
    {
        self.commit(commit)
    }

    fn commit<C, E>(&mut self, commit: C) -> Outcome
    where
        C: FnOnce(&str) -> Result<(), E>,
        E: Display,
    {
        let draft = match std::mem::replace(&mut self.state, CellState::Committing) {
            CellState::Editing { draft } => draft,
            other => {
                self.state = other;
                return Outcome::Ignored;
            }
        };

        if draft == self.value {
            self.state = CellState::Display;
            self.error = None;
            return Outcome::Unchanged;
        }

        match commit(&draft) {
            Ok(()) => {
                debug!(from = %self.value, to = %draft, "committed cell");
                self.value = draft;
                self.state = CellState::Display;
                self.error = None;
                Outcome::Committed
            }
            Err(e) => {
                let message = e.to_string();
                self.state = CellState::Editing { draft };
                self.error = Some(message.clone());
                Outcome::Rejected(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept(_: &str) -> Result<(), String> {
        Ok(())
    }

    #[test]
    fn focus_seeds_draft_with_value() {
        let mut cell = EditCell::new("Food");
        cell.focus();
        assert_eq!(
            cell.state(),
            &CellState::Editing {
                draft: "Food".into()
            }
        );
    }

    #[test]
    fn enter_commits_through_callback() {
        let mut cell = EditCell::new("Food");
        let mut written = None;
        cell.focus();
        cell.set_draft("Groceries");

        let outcome = cell.key(Key::Enter, |v| -> Result<(), String> {
            written = Some(v.to_string());
            Ok(())
        });

        assert_eq!(outcome, Outcome::Committed);
        assert_eq!(written.as_deref(), Some("Groceries"));
        assert_eq!(cell.value(), "Groceries");
        assert_eq!(cell.state(), &CellState::Display);
    }

    #[test]
    fn blur_commits_too() {
        let mut cell = EditCell::new("a");
        cell.focus();
        cell.set_draft("b");
        assert_eq!(cell.blur(accept), Outcome::Committed);
        assert_eq!(cell.value(), "b");
    }

    #[test]
    fn escape_reverts_without_commit() {
        let mut cell = EditCell::new("Food");
        cell.focus();
        cell.set_draft("Junk");

        let outcome = cell.key(Key::Escape, |_| -> Result<(), String> {
            panic!("escape must not commit")
        });

        assert_eq!(outcome, Outcome::Reverted);
        assert_eq!(cell.value(), "Food");
        assert_eq!(cell.state(), &CellState::Display);
    }

    #[test]
    fn unchanged_draft_skips_callback() {
        let mut cell = EditCell::new("Food");
        cell.focus();

        let outcome = cell.key(Key::Enter, |_| -> Result<(), String> {
            panic!("nothing to write")
        });
        assert_eq!(outcome, Outcome::Unchanged);
    }

    #[test]
    fn rejected_commit_keeps_draft() {
        let mut cell = EditCell::new("5.40");
        cell.focus();
        cell.set_draft("-1");

        let outcome = cell.key(Key::Enter, |_| Err("amount must be greater than zero"));

        assert_eq!(
            outcome,
            Outcome::Rejected("amount must be greater than zero".into())
        );
        assert_eq!(cell.value(), "5.40");
        assert_eq!(cell.error(), Some("amount must be greater than zero"));
        assert_eq!(cell.state(), &CellState::Editing { draft: "-1".into() });

        assert_eq!(cell.key(Key::Escape, accept), Outcome::Reverted);
        assert_eq!(cell.error(), None);
    }

    #[test]
    fn keys_are_ignored_outside_editing() {
        let mut cell = EditCell::new("x");
        assert_eq!(cell.key(Key::Enter, accept), Outcome::Ignored);
        assert_eq!(cell.key(Key::Escape, accept), Outcome::Ignored);
        cell.set_draft("y");
        assert_eq!(cell.value(), "x");
    }
}
