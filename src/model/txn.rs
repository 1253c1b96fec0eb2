use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{amount, parse_date, required, FieldError, Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Income,
    Expense,
}

impl TxnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnKind::Income => "income",
            TxnKind::Expense => "expense",
        }
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxnKind {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxnKind::Income),
            "expense" => Ok(TxnKind::Expense),
            _ => Err(FieldError::invalid(TxnField::Kind, "must be income or expense")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnStatus {
    Cleared,
    Pending,
}

impl TxnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxnStatus::Cleared => "cleared",
            TxnStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for TxnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxnStatus {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cleared" => Ok(TxnStatus::Cleared),
            "pending" => Ok(TxnStatus::Pending),
            _ => Err(FieldError::invalid(TxnField::Status, "must be cleared or pending")),
        }
    }
}

/// A ledger entry. `amount` is always a positive magnitude, the sign lives in
/// `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub payee: String,
    pub category: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TxnKind,
    pub account_id: String,
    pub status: TxnStatus,
}

impl Transaction {
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TxnKind::Income => self.amount,
            TxnKind::Expense => -self.amount,
        }
    }

    pub fn day(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnField {
    Date,
    Payee,
    Category,
    Amount,
    Kind,
    Account,
    Status,
}

impl fmt::Display for TxnField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TxnField::Date => "date",
            TxnField::Payee => "payee",
            TxnField::Category => "category",
            TxnField::Amount => "amount",
            TxnField::Kind => "type",
            TxnField::Account => "accountId",
            TxnField::Status => "status",
        })
    }
}

impl FromStr for TxnField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(TxnField::Date),
            "payee" => Ok(TxnField::Payee),
            "category" => Ok(TxnField::Category),
            "amount" => Ok(TxnField::Amount),
            "type" | "kind" => Ok(TxnField::Kind),
            "accountid" | "account_id" | "account" => Ok(TxnField::Account),
            "status" => Ok(TxnField::Status),
            other => Err(FieldError::Unknown(other.to_string())),
        }
    }
}

impl Record for Transaction {
    type Field = TxnField;

    const SEARCHABLE: &'static [TxnField] = &[TxnField::Payee, TxnField::Category];

    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: TxnField) -> Value<'_> {
        match field {
            TxnField::Date => Value::Date(&self.date),
            TxnField::Payee => Value::Text(&self.payee),
            TxnField::Category => Value::Text(&self.category),
            TxnField::Amount => Value::Number(self.amount),
            TxnField::Kind => Value::Text(self.kind.as_str()),
            TxnField::Account => Value::Text(&self.account_id),
            TxnField::Status => Value::Text(self.status.as_str()),
        }
    }

    fn assign(&mut self, field: TxnField, value: &str) -> Result<(), FieldError> {
        match field {
            TxnField::Date => match parse_date(value) {
                Some(day) => self.date = day.format("%Y-%m-%d").to_string(),
                None => return Err(FieldError::invalid(field, "must be a valid date")),
            },
            TxnField::Payee => self.payee = required(field, value)?,
            TxnField::Category => self.category = required(field, value)?,
            TxnField::Amount => {
                let n = amount(field, value)?;
                if n <= 0.0 {
                    return Err(FieldError::invalid(field, "must be greater than zero"));
                }
                self.amount = n;
            }
            TxnField::Kind => self.kind = value.parse()?,
            TxnField::Account => self.account_id = required(field, value)?,
            TxnField::Status => self.status = value.parse()?,
        }

        Ok(())
    }
}
