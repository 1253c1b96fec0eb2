use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate};
use ulid::Ulid;

use crate::model::{
    is_email, parse_date, Account, Client, ClientStatus, Transaction, TxnKind, TxnStatus,
};
use crate::store::Table;

/// Field name → message for every field that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result<T>(self, value: Option<T>) -> Result<T, ValidationErrors> {
        match value {
            Some(v) if self.is_empty() => Ok(v),
            _ => Err(self),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Raw inputs of the create-client form.
#[derive(Debug, Clone, Default)]
pub struct ClientForm {
    pub name: String,
    pub email: String,
    pub company: String,
    pub status: String,
    pub revenue: String,
}

impl ClientForm {
    pub fn validate(&self) -> Result<Client, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }

        if self.email.trim().is_empty() {
            errors.add("email", "Email is required");
        } else if !is_email(&self.email) {
            errors.add("email", "Enter a valid email address");
        }

        let status = if self.status.trim().is_empty() {
            Some(ClientStatus::Active)
        } else {
            self.status.parse::<ClientStatus>().ok()
        };
        if status.is_none() {
            errors.add("status", "Status must be Active, Pending, or Inactive");
        }

        let revenue = if self.revenue.trim().is_empty() {
            Some(0.0)
        } else {
            parse_amount(&self.revenue)
        };
        match revenue {
            None => errors.add("revenue", "Revenue must be a number"),
            Some(r) if r < 0.0 => errors.add("revenue", "Revenue cannot be negative"),
            _ => {}
        }

        let client = match (status, revenue) {
            (Some(status), Some(revenue)) => Some(Client {
                id: Ulid::new().to_string(),
                name: self.name.trim().to_string(),
                email: self.email.trim().to_string(),
                company: self.company.trim().to_string(),
                status,
                revenue,
                last_contact: today().format("%Y-%m-%d").to_string(),
            }),
            _ => None,
        };

        errors.into_result(client)
    }

    /// Validate and hand the new record to `on_add`. `on_add` is never called
    /// when any field is invalid.
    pub fn submit<F, T>(&self, on_add: F) -> Result<T, ValidationErrors>
    where
        F: FnOnce(Client) -> T,
    {
        self.validate().map(on_add)
    }
}

/// Raw inputs of the add-transaction form.
#[derive(Debug, Clone, Default)]
pub struct TransactionForm {
    pub date: String,
    pub payee: String,
    pub category: String,
    pub amount: String,
    pub kind: String,
    pub account_id: String,
    pub status: String,
}

impl TransactionForm {
    /// Check the form. When `accounts` is non-empty the account must exist in it.
    pub fn validate(&self, accounts: &Table<Account>) -> Result<Transaction, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let date = if self.date.trim().is_empty() {
            Some(today())
        } else {
            parse_date(&self.date)
        };
        if date.is_none() {
            errors.add("date", "Enter a valid date");
        }

        if self.payee.trim().is_empty() {
            errors.add("payee", "Payee is required");
        }
        if self.category.trim().is_empty() {
            errors.add("category", "Category is required");
        }

        let amount = if self.amount.trim().is_empty() {
            errors.add("amount", "Amount is required");
            None
        } else {
            parse_amount(&self.amount)
        };
        match amount {
            None => errors.add("amount", "Amount must be a number"),
            Some(a) if a <= 0.0 => errors.add("amount", "Amount must be greater than zero"),
            _ => {}
        }

        let kind = self.kind.parse::<TxnKind>().ok();
        if kind.is_none() {
            errors.add("type", "Type must be income or expense");
        }

        let account_id = self.account_id.trim();
        if account_id.is_empty() {
            errors.add("accountId", "Account is required");
        } else if !accounts.is_empty() && !accounts.contains(account_id) {
            errors.add("accountId", "Unknown account");
        }

        let status = if self.status.trim().is_empty() {
            Some(TxnStatus::Cleared)
        } else {
            self.status.parse::<TxnStatus>().ok()
        };
        if status.is_none() {
            errors.add("status", "Status must be cleared or pending");
        }

        let txn = match (date, amount, kind, status) {
            (Some(date), Some(amount), Some(kind), Some(status)) => Some(Transaction {
                id: Ulid::new().to_string(),
                date: date.format("%Y-%m-%d").to_string(),
                payee: self.payee.trim().to_string(),
                category: self.category.trim().to_string(),
                amount,
                kind,
                account_id: account_id.to_string(),
                status,
            }),
            _ => None,
        };

        errors.into_result(txn)
    }

    pub fn submit<F, T>(&self, accounts: &Table<Account>, on_add: F) -> Result<T, ValidationErrors>
    where
        F: FnOnce(Transaction) -> T,
    {
        self.validate(accounts).map(on_add)
    }
}
