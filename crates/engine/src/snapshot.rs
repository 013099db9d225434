//! Full-state backup document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Category, EngineError, OpeningBalance, ResultEngine, Settings, Transaction, User};

/// Export/import document.
///
/// Every collection is optional: importing a document overwrites only the
/// collections it carries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<Transaction>>,
    #[serde(default, alias = "initialBalance", skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<OpeningBalance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,
}

impl Backup {
    /// Parses an import document. Anything other than a well-formed JSON object
    /// whose transactions pass [`Transaction::check`] is reported as
    /// [`EngineError::Corrupted`].
    pub fn parse(text: &str) -> ResultEngine<Self> {
        let value: serde_json::Value = serde_json::from_str(text)
            .map_err(|e| EngineError::Corrupted(format!("invalid backup file: {e}")))?;
        if !value.is_object() {
            return Err(EngineError::Corrupted(
                "invalid backup file: expected a JSON object".to_string(),
            ));
        }
        let backup: Self = serde_json::from_value(value)
            .map_err(|e| EngineError::Corrupted(format!("invalid backup file: {e}")))?;
        for transaction in backup.transactions.iter().flatten() {
            transaction
                .check()
                .map_err(|e| EngineError::Corrupted(format!("invalid backup file: {e}")))?;
        }
        Ok(backup)
    }

    pub fn to_json(&self) -> ResultEngine<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Default file name for a backup taken on `date`.
    pub fn file_name(date: NaiveDate) -> String {
        format!("expense-tracker-backup-{}.json", date.format("%Y-%m-%d"))
    }
}
