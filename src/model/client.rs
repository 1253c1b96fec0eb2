use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{amount, required, FieldError, Record, Value};

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern");
}

pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value.trim())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientStatus {
    Active,
    Pending,
    Inactive,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "Active",
            ClientStatus::Pending => "Pending",
            ClientStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClientStatus {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(ClientStatus::Active),
            "pending" => Ok(ClientStatus::Pending),
            "inactive" => Ok(ClientStatus::Inactive),
            _ => Err(FieldError::invalid(
                ClientField::Status,
                "must be one of Active, Pending, or Inactive",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: String,
    pub status: ClientStatus,
    #[serde(default)]
    pub revenue: f64,
    #[serde(default)]
    pub last_contact: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    Name,
    Email,
    Company,
    Status,
    Revenue,
    LastContact,
}

impl fmt::Display for ClientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ClientField::Name => "name",
            ClientField::Email => "email",
            ClientField::Company => "company",
            ClientField::Status => "status",
            ClientField::Revenue => "revenue",
            ClientField::LastContact => "lastContact",
        })
    }
}

impl FromStr for ClientField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(ClientField::Name),
            "email" => Ok(ClientField::Email),
            "company" => Ok(ClientField::Company),
            "status" => Ok(ClientField::Status),
            "revenue" => Ok(ClientField::Revenue),
            "lastcontact" | "last_contact" | "last-contact" => Ok(ClientField::LastContact),
            other => Err(FieldError::Unknown(other.to_string())),
        }
    }
}

impl Record for Client {
    type Field = ClientField;

    const SEARCHABLE: &'static [ClientField] =
        &[ClientField::Name, ClientField::Company, ClientField::Email];

    fn id(&self) -> &str {
        &self.id
    }

    fn value(&self, field: ClientField) -> Value<'_> {
        match field {
            ClientField::Name => Value::Text(&self.name),
            ClientField::Email => Value::Text(&self.email),
            ClientField::Company => Value::Text(&self.company),
            ClientField::Status => Value::Text(self.status.as_str()),
            ClientField::Revenue => Value::Number(self.revenue),
            ClientField::LastContact => Value::Date(&self.last_contact),
        }
    }

    fn assign(&mut self, field: ClientField, value: &str) -> Result<(), FieldError> {
        match field {
            ClientField::Name => self.name = required(field, value)?,
            ClientField::Email => {
                if !is_email(value) {
                    return Err(FieldError::invalid(field, "must be a valid email address"));
                }
                self.email = value.trim().to_string();
            }
            ClientField::Company => self.company = value.trim().to_string(),
            ClientField::Status => self.status = value.parse()?,
            ClientField::Revenue => {
                let revenue = amount(field, value)?;
                if revenue < 0.0 {
                    return Err(FieldError::invalid(field, "must not be negative"));
                }
                self.revenue = revenue;
            }
            ClientField::LastContact => self.last_contact = value.trim().to_string(),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client {
            id: "c1".into(),
            name: "Ada Lovelace".into(),
            email: "ada@analytical.io".into(),
            company: "Analytical Engines".into(),
            status: ClientStatus::Active,
            revenue: 1200.0,
            last_contact: "2024-02-01".into(),
        }
    }

    #[test]
    fn email_pattern() {
        assert!(is_email("ada@analytical.io"));
        assert!(is_email("  x@y.co "));
        assert!(!is_email("ada@"));
        assert!(!is_email("ada analytical.io"));
        assert!(!is_email(""));
    }

    #[test]
    fn assign_rejects_invalid_values_without_mutating() {
        let mut c = client();

        assert!(c.assign(ClientField::Revenue, "-5").is_err());
        assert!(c.assign(ClientField::Revenue, "lots").is_err());
        assert!(c.assign(ClientField::Email, "nope").is_err());
        assert!(c.assign(ClientField::Name, "   ").is_err());
        assert_eq!(c, client());
    }

    #[test]
    fn assign_status_case_insensitively() {
        let mut c = client();
        c.assign(ClientField::Status, "inactive").unwrap();
        assert_eq!(c.status, ClientStatus::Inactive);
    }

    #[test]
    fn field_names_round_trip_through_display() {
        for field in [
            ClientField::Name,
            ClientField::Email,
            ClientField::Company,
            ClientField::Status,
            ClientField::Revenue,
            ClientField::LastContact,
        ] {
            assert_eq!(field.to_string().parse::<ClientField>().unwrap(), field);
        }
        assert_eq!(
            "phone".parse::<ClientField>(),
            Err(FieldError::Unknown("phone".into()))
        );
    }

    #[test]
    fn deserializes_camel_case_snapshot_rows() {
        let c: Client = serde_json::from_str(
            r#"{"id":"7","name":"Grace","email":"g@navy.mil","company":"USN","status":"Pending","revenue":0,"lastContact":"2024-03-01"}"#,
        )
        .unwrap();

        assert_eq!(c.status, ClientStatus::Pending);
        assert_eq!(c.last_contact, "2024-03-01");
    }
}
