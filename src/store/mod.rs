mod table;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Account, Client, FieldError, Transaction};

pub use table::Table;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a record with id {0} already exists")]
    AlreadyExists(String),
    #[error("no record with id {0}")]
    NotFound(String),
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Error) -> bool {
        self.to_string() == other.to_string()
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

/// On-disk shape of the store.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Process-lifetime record store. Created at start-up from a snapshot and
/// written back only on request.
#[derive(Debug, Default)]
pub struct MemoryStore {
    path: Option<PathBuf>,
    accounts: Table<Account>,
    clients: Table<Client>,
    txns: Table<Transaction>,
}

impl MemoryStore {
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        Ok(Self {
            path: None,
            accounts: Table::new(snapshot.accounts)?,
            clients: Table::new(snapshot.clients)?,
            txns: Table::new(snapshot.transactions)?,
        })
    }

    /// Load the snapshot at `path`. A missing or blank file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let snapshot = match std::fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Snapshot::default(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No data file at {}, starting empty.", path.display());
                Snapshot::default()
            }
            Err(e) => return Err(e.into()),
        };

        let mut store = Self::from_snapshot(snapshot)?;
        store.path = Some(path.to_path_buf());
        debug!(
            accounts = store.accounts.len(),
            clients = store.clients.len(),
            transactions = store.txns.len(),
            "loaded store"
        );

        Ok(store)
    }

    /// Write the store back to the file it was opened from.
    pub fn persist(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.save(path),
            None => Ok(()),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let snapshot = Snapshot {
            accounts: self.accounts.records().to_vec(),
            clients: self.clients.records().to_vec(),
            transactions: self.txns.records().to_vec(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        debug!("wrote store to {}", path.display());

        Ok(())
    }

    pub fn accounts(&self) -> &Table<Account> {
        &self.accounts
    }

    pub fn clients(&self) -> &Table<Client> {
        &self.clients
    }

    pub fn clients_mut(&mut self) -> &mut Table<Client> {
        &mut self.clients
    }

    pub fn txns(&self) -> &Table<Transaction> {
        &self.txns
    }

    pub fn txns_mut(&mut self) -> &mut Table<Transaction> {
        &mut self.txns
    }

    /// Writable transactions next to the accounts they reference.
    pub fn ledger_mut(&mut self) -> (&Table<Account>, &mut Table<Transaction>) {
        (&self.accounts, &mut self.txns)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::model::{AccountKind, ClientStatus, TxnKind, TxnStatus};

    use super::*;

    pub(crate) fn sample_snapshot() -> Snapshot {
        Snapshot {
            accounts: vec![Account {
                id: "acc-1".into(),
                name: "Everyday Checking".into(),
                institution: "First Bank".into(),
                kind: AccountKind::Checking,
                balance: 2500.0,
            }],
            clients: vec![Client {
                id: "c1".into(),
                name: "Ada Lovelace".into(),
                email: "ada@analytical.io".into(),
                company: "Analytical Engines".into(),
                status: ClientStatus::Active,
                revenue: 1200.0,
                last_contact: "2024-02-01".into(),
            }],
            transactions: vec![
                Transaction {
                    id: "1".into(),
                    date: "2024-01-05".into(),
                    payee: "Coffee".into(),
                    category: "Food".into(),
                    amount: 5.4,
                    kind: TxnKind::Expense,
                    account_id: "acc-1".into(),
                    status: TxnStatus::Cleared,
                },
                Transaction {
                    id: "2".into(),
                    date: "2024-01-01".into(),
                    payee: "Salary".into(),
                    category: "Income".into(),
                    amount: 4200.0,
                    kind: TxnKind::Income,
                    account_id: "acc-1".into(),
                    status: TxnStatus::Cleared,
                },
            ],
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(dir.path().join("state.json")).unwrap();

        assert!(store.clients().is_empty());
        assert!(store.txns().is_empty());
    }

    #[test]
    fn blank_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "\n").unwrap();

        let store = MemoryStore::open(&path).unwrap();
        assert!(store.accounts().is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(MemoryStore::open(&path), Err(Error::Parse(_))));
    }

    #[test]
    fn persist_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        MemoryStore::from_snapshot(sample_snapshot())
            .unwrap()
            .save(&path)
            .unwrap();

        let mut store = MemoryStore::open(&path).unwrap();
        assert_eq!(store.txns().len(), 2);
        store.txns_mut().rows_mut().retain(|t| t.id != "1");
        store.persist().unwrap();

        let reopened = MemoryStore::open(&path).unwrap();
        assert_eq!(reopened.txns().len(), 1);
        assert_eq!(reopened.clients().get("c1").unwrap().name, "Ada Lovelace");
    }

    #[test]
    fn duplicate_ids_in_snapshot_are_rejected() {
        let mut snapshot = sample_snapshot();
        snapshot.clients.push(snapshot.clients[0].clone());

        assert_eq!(
            MemoryStore::from_snapshot(snapshot).unwrap_err(),
            Error::AlreadyExists("c1".into())
        );
    }
}
