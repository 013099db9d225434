//! Local persisted state.
//!
//! Data is kept as string values under fixed keys, the same layout a browser
//! front-end keeps in local storage. [`FileStore`] persists the whole map as
//! one JSON file; [`MemoryStore`] backs tests.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::{
    Backup, Category, EngineError, OpeningBalance, ResultEngine, Settings, Transaction, User,
    category::default_categories, users::default_users,
};

pub mod keys {
    pub const TRANSACTIONS: &str = "transactions";
    pub const OPENING_BALANCE: &str = "initialBalance";
    pub const CATEGORIES: &str = "customCategories";
    pub const USERS: &str = "users";
    pub const SETTINGS: &str = "adminSettings";

    pub const ALL: [&str; 5] = [TRANSACTIONS, OPENING_BALANCE, CATEGORIES, USERS, SETTINGS];
}

pub const DEFAULT_DATA_PATH: &str = "data/celengan.json";

/// String key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> ResultEngine<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> ResultEngine<()>;
    fn remove(&mut self, key: &str) -> ResultEngine<()>;
    fn clear(&mut self) -> ResultEngine<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ResultEngine<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> ResultEngine<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> ResultEngine<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> ResultEngine<()> {
        self.entries.clear();
        Ok(())
    }
}

/// JSON file holding every key. Each write rewrites the file.
///
/// Two processes sharing a file overwrite each other on the next save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens `path`. A missing file starts empty; an unreadable one is logged
    /// and also starts empty, so every key falls back to its default.
    pub fn open(path: impl Into<PathBuf>) -> ResultEngine<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "local store is corrupted, starting empty");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> ResultEngine<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, payload)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ResultEngine<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> ResultEngine<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> ResultEngine<()> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn clear(&mut self) -> ResultEngine<()> {
        self.entries.clear();
        self.flush()
    }
}

/// Typed access to the persisted collections.
#[derive(Debug, Clone, Default)]
pub struct LocalState<S> {
    store: S,
}

impl<S: KeyValueStore> LocalState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads `key`. `Ok(None)` means it was never written; a value that does
    /// not parse is [`EngineError::Corrupted`].
    fn try_read<T: DeserializeOwned>(&self, key: &str) -> ResultEngine<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| EngineError::Corrupted(format!("{key}: {e}")))
    }

    /// Reads `key`; a missing or unreadable value yields `None`.
    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.try_read(key).unwrap_or_else(|err| {
            warn!(key, %err, "local state is unreadable, using defaults");
            None
        })
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> ResultEngine<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, raw)
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.read(keys::TRANSACTIONS).unwrap_or_default()
    }

    /// Like [`transactions`](Self::transactions), but an unreadable list is an
    /// error instead of an empty one. Callers that write the list back use
    /// this so a save never replaces data that merely failed to load.
    pub fn try_transactions(&self) -> ResultEngine<Vec<Transaction>> {
        Ok(self.try_read(keys::TRANSACTIONS)?.unwrap_or_default())
    }

    pub fn categories(&self) -> Vec<Category> {
        self.read(keys::CATEGORIES)
            .unwrap_or_else(default_categories)
    }

    pub fn users(&self) -> Vec<User> {
        self.read(keys::USERS).unwrap_or_else(default_users)
    }

    pub fn settings(&self) -> Settings {
        self.read(keys::SETTINGS).unwrap_or_default()
    }

    pub fn opening_balance(&self) -> OpeningBalance {
        self.read(keys::OPENING_BALANCE).unwrap_or_default()
    }

    pub fn save_transactions(&mut self, transactions: &[Transaction]) -> ResultEngine<()> {
        self.write(keys::TRANSACTIONS, transactions)
    }

    pub fn save_categories(&mut self, categories: &[Category]) -> ResultEngine<()> {
        self.write(keys::CATEGORIES, categories)
    }

    pub fn save_users(&mut self, users: &[User]) -> ResultEngine<()> {
        self.write(keys::USERS, users)
    }

    pub fn save_settings(&mut self, settings: &Settings) -> ResultEngine<()> {
        self.write(keys::SETTINGS, settings)
    }

    pub fn save_opening_balance(&mut self, balance: OpeningBalance) -> ResultEngine<()> {
        self.write(keys::OPENING_BALANCE, &balance)
    }

    pub fn export(&self, now: DateTime<Utc>) -> Backup {
        Backup {
            categories: Some(self.categories()),
            users: Some(self.users()),
            settings: Some(self.settings()),
            transactions: Some(self.transactions()),
            opening_balance: Some(self.opening_balance()),
            export_date: Some(now),
        }
    }

    /// Overwrites each collection present in `backup`; the rest is untouched.
    ///
    /// A transaction failing [`Transaction::check`] rejects the whole backup
    /// before anything is written.
    pub fn import(&mut self, backup: &Backup) -> ResultEngine<()> {
        for transaction in backup.transactions.iter().flatten() {
            transaction
                .check()
                .map_err(|e| EngineError::Corrupted(format!("invalid backup: {e}")))?;
        }
        if let Some(categories) = &backup.categories {
            self.save_categories(categories)?;
        }
        if let Some(users) = &backup.users {
            self.save_users(users)?;
        }
        if let Some(settings) = &backup.settings {
            self.save_settings(settings)?;
        }
        if let Some(transactions) = &backup.transactions {
            self.save_transactions(transactions)?;
        }
        if let Some(balance) = backup.opening_balance {
            self.save_opening_balance(balance)?;
        }
        Ok(())
    }

    /// Parses then imports `text`. A malformed document writes nothing.
    pub fn import_str(&mut self, text: &str) -> ResultEngine<Backup> {
        let backup = Backup::parse(text)?;
        self.import(&backup)?;
        Ok(backup)
    }

    pub fn clear_all(&mut self) -> ResultEngine<()> {
        self.store.clear()
    }
}

impl LocalState<FileStore> {
    pub fn open(path: impl Into<PathBuf>) -> ResultEngine<Self> {
        Ok(Self::new(FileStore::open(path)?))
    }
}
