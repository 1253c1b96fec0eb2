mod account;
mod client;
mod txn;

use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

pub use account::{Account, AccountField, AccountKind};
pub use client::{is_email, Client, ClientField, ClientStatus};
pub use txn::{Transaction, TxnField, TxnKind, TxnStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown field {0:?}")]
    Unknown(String),
    #[error("invalid {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl FieldError {
    pub(crate) fn invalid<F: std::fmt::Display>(field: F, reason: &str) -> Self {
        FieldError::Invalid {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A borrowed view of one record field, typed by how it compares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Text(&'a str),
    Number(f64),
    /// Dates stay as written; they are parsed when compared.
    Date(&'a str),
}

impl<'a> Value<'a> {
    pub fn text(&self) -> std::borrow::Cow<'a, str> {
        match *self {
            Value::Text(s) | Value::Date(s) => s.into(),
            Value::Number(n) => n.to_string().into(),
        }
    }
}

/// The field accessor table the list view engine is generic over.
pub trait Record: Clone + Debug {
    type Field: Copy + Eq + Debug + std::fmt::Display + 'static;

    /// Fields tested by free-text search.
    const SEARCHABLE: &'static [Self::Field];

    fn id(&self) -> &str;

    fn value(&self, field: Self::Field) -> Value<'_>;

    /// Replace a single field from its textual form. Leaves the record
    /// untouched on error.
    fn assign(&mut self, field: Self::Field, value: &str) -> Result<(), FieldError>;
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse the date spellings found in record data into an instant.
pub fn parse_instant(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_instant(raw).map(|dt| dt.date())
}

fn required(field: impl std::fmt::Display, value: &str) -> Result<String, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FieldError::invalid(field, "must not be empty"));
    }

    Ok(value.to_string())
}

fn amount(field: impl std::fmt::Display, value: &str) -> Result<f64, FieldError> {
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(FieldError::invalid(field, "must be a number")),
    }
}
