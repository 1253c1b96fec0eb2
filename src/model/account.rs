use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{amount, required, FieldError, Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
    Investment,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Checking => "checking",
            AccountKind::Savings => "savings",
            AccountKind::Credit => "credit",
            AccountKind::Investment => "investment",
        }
    }
}

impl FromStr for AccountKind {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "checking" => Ok(AccountKind::Checking),
            "savings" => Ok(AccountKind::Savings),
            "credit" => Ok(AccountKind::Credit),
            "investment" => Ok(AccountKind::Investment),
            _ => Err(FieldError::invalid(
                AccountField::Kind,
                "must be checking, savings, credit, or investment",
            )),
        }
    }
}

/// Wallet account referenced by `Transaction::account_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub institution: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub balance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountField {
    Name,
    Institution,
    Kind,
    Balance,
}

impl fmt::Display for AccountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccountField::Name => "name",
            AccountField::Institution => "institution",
            AccountField::Kind => "type",
            AccountField::Balance => "balance",
        })
    }
}

impl FromStr for AccountField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(AccountField::Name),
            "institution" => Ok(AccountField::Institution),
            "type" | "kind" => Ok(AccountField::Kind),
            "balance" => Ok(AccountField::Balance),
            other => Err(FieldError::Unknown(other.to_string())),
        }
    }
}

impl Record for Account {
    type Field = AccountField;

    const SEARCHABLE: &'static [AccountField] = &[AccountField::Name, AccountField::Institution];

    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: AccountField) -> Value<'_> {
        match field {
            AccountField::Name => Value::Text(&self.name),
            AccountField::Institution => Value::Text(&self.institution),
            AccountField::Kind => Value::Text(self.kind.as_str()),
            AccountField::Balance => Value::Number(self.balance),
        }
    }

    fn assign(&mut self, field: AccountField, value: &str) -> Result<(), FieldError> {
        match field {
            AccountField::Name => self.name = required(field, value)?,
            AccountField::Institution => self.institution = value.trim().to_string(),
            AccountField::Kind => self.kind = value.parse()?,
            AccountField::Balance => self.balance = amount(field, value)?,
        }

        Ok(())
    }
}
