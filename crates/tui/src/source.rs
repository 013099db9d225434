//! Remote-first data source with a local fallback.
//!
//! The remote service is preferred. If any read fails during the initial
//! load, the session switches to [`Tier::Local`] for good and works against
//! the key-value store. Writes go to the active tier only, and the tracker
//! is updated only after the write succeeded. The opening balance is always
//! kept locally.
//!
//! Stored transactions that fail validation are skipped one by one. When the
//! stored list cannot be read at all, local transaction writes are refused
//! for the session so the unread history is never overwritten.

use chrono::NaiveDate;
use engine::{
    EngineError, Intent, Money, OpeningBalance, Tier, Tracker, Transaction, TransactionDraft,
    storage::{KeyValueStore, LocalState},
};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::client::{Client, ClientError};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}")]
    Invalid(EngineError),
    #[error(transparent)]
    Remote(#[from] ClientError),
    #[error("local store: {0}")]
    Local(EngineError),
}

impl From<EngineError> for SourceError {
    fn from(err: EngineError) -> Self {
        if err.is_validation() {
            Self::Invalid(err)
        } else {
            Self::Local(err)
        }
    }
}

impl SourceError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Invalid(err) => err.to_string(),
            Self::Remote(err) => err.user_message(),
            Self::Local(err) => format!("Could not save locally: {err}"),
        }
    }
}

/// What the initial load produced besides the tracker contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Loaded {
    pub tier: Tier,
    pub users: usize,
    /// Stored transactions left out because they failed validation.
    pub skipped: usize,
    /// The stored transaction list was unreadable; local writes are refused.
    pub read_only: bool,
}

pub struct DataSource<S> {
    remote: Option<Client>,
    local: LocalState<S>,
    read_only: bool,
}

impl<S: KeyValueStore> DataSource<S> {
    /// `remote: None` runs the whole session on the local tier.
    pub fn new(remote: Option<Client>, local: LocalState<S>) -> Self {
        Self {
            remote,
            local,
            read_only: false,
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Fills `tracker` from the remote service, or from the local store when
    /// the service is unavailable.
    pub async fn load(&mut self, tracker: &mut Tracker) -> Loaded {
        self.read_only = false;
        if let Some(client) = &self.remote {
            match self.load_remote(client, tracker).await {
                Ok(users) => {
                    info!(
                        base_url = %client.base_url(),
                        categories = tracker.categories().len(),
                        transactions = tracker.transactions().len(),
                        users,
                        "loaded data from remote service"
                    );
                    return Loaded {
                        tier: Tier::Remote,
                        users,
                        skipped: 0,
                        read_only: false,
                    };
                }
                Err(err) => {
                    warn!(%err, "remote service unavailable, falling back to local store");
                }
            }
        }

        let (users, skipped) = self.load_local(tracker);
        info!(
            transactions = tracker.transactions().len(),
            skipped,
            read_only = self.read_only,
            "loaded data from local store"
        );
        Loaded {
            tier: Tier::Local,
            users,
            skipped,
            read_only: self.read_only,
        }
    }

    async fn load_remote(&self, client: &Client, tracker: &mut Tracker) -> Result<usize, SourceError> {
        let categories = client.categories().await?;
        let transactions = client.transactions().await?;
        let users = client.users().await?;

        let mut next = Tracker::new(Tier::Remote);
        next.apply(Intent::ReplaceCategories(categories))?;
        next.apply(Intent::ReplaceTransactions(transactions))?;
        next.apply(Intent::SetOpeningBalance(self.local.opening_balance()))?;
        next.apply(Intent::SetFilter(tracker.filter().clone()))?;
        *tracker = next;
        Ok(users.len())
    }

    /// Returns the user count and how many stored transactions were skipped.
    fn load_local(&mut self, tracker: &mut Tracker) -> (usize, usize) {
        let stored = self.local.try_transactions().unwrap_or_else(|err| {
            error!(%err, "stored transactions are unreadable, local writes disabled");
            self.read_only = true;
            Vec::new()
        });
        let (valid, invalid): (Vec<_>, Vec<_>) =
            stored.into_iter().partition(|t| t.check().is_ok());
        if !invalid.is_empty() {
            let ids: Vec<i64> = invalid.iter().map(|t| t.id).collect();
            warn!(?ids, "skipping stored transactions that fail validation");
        }

        let mut next = Tracker::new(Tier::Local);
        if let Err(err) = next.apply(Intent::ReplaceTransactions(valid)) {
            error!(%err, "stored transactions rejected, local writes disabled");
            self.read_only = true;
        }
        let intents = [
            Intent::ReplaceCategories(self.local.categories()),
            Intent::SetOpeningBalance(self.local.opening_balance()),
            Intent::SetFilter(tracker.filter().clone()),
        ];
        for intent in intents {
            if let Err(err) = next.apply(intent) {
                warn!(%err, "stored data is invalid, keeping the default");
            }
        }
        *tracker = next;
        (self.local.users().len(), invalid.len())
    }

    /// Validates and stores a new transaction on the active tier.
    ///
    /// `now_ms` seeds the id of locally created transactions.
    pub async fn add(
        &mut self,
        tracker: &mut Tracker,
        draft: &TransactionDraft,
        today: NaiveDate,
        now_ms: i64,
    ) -> Result<Transaction, SourceError> {
        let input = draft.parse(today).map_err(SourceError::Invalid)?;

        let transaction = match (tracker.tier(), &self.remote) {
            (Tier::Remote, Some(client)) => client.create_transaction(&input).await.map_err(|err| {
                error!(%err, "failed to create transaction");
                err
            })?,
            _ => Transaction::new(tracker.next_local_id(now_ms), input),
        };

        self.commit(tracker, Intent::AddTransaction(transaction.clone()))?;
        info!(id = transaction.id, tier = tracker.tier().label(), "transaction added");
        Ok(transaction)
    }

    pub async fn delete(&mut self, tracker: &mut Tracker, id: i64) -> Result<(), SourceError> {
        if let (Tier::Remote, Some(client)) = (tracker.tier(), &self.remote) {
            client.delete_transaction(id).await.map_err(|err| {
                error!(%err, id, "failed to delete transaction");
                err
            })?;
        }

        self.commit(tracker, Intent::DeleteTransaction(id))?;
        info!(id, tier = tracker.tier().label(), "transaction deleted");
        Ok(())
    }

    /// Parses `input` and stores it as the opening balance.
    pub fn set_opening_balance(
        &mut self,
        tracker: &mut Tracker,
        input: &str,
    ) -> Result<OpeningBalance, SourceError> {
        if input.trim().is_empty() {
            return Err(SourceError::Invalid(EngineError::MissingField(
                "opening balance".to_string(),
            )));
        }
        let amount: Money = input.parse().map_err(SourceError::Invalid)?;
        let balance = OpeningBalance::new(amount).map_err(SourceError::Invalid)?;

        self.local.save_opening_balance(balance)?;
        tracker.apply(Intent::SetOpeningBalance(balance))?;
        Ok(balance)
    }

    /// Applies `intent` to a copy of `tracker`, persists the result when the
    /// local tier is active, then swaps it in.
    fn commit(&mut self, tracker: &mut Tracker, intent: Intent) -> Result<(), SourceError> {
        let mut next = tracker.clone();
        next.apply(intent)?;
        if next.tier() == Tier::Local {
            if self.read_only {
                return Err(SourceError::Local(EngineError::Corrupted(
                    "stored transactions are unreadable, restore a backup first".to_string(),
                )));
            }
            self.local
                .save_transactions(next.transactions())
                .map_err(SourceError::Local)?;
        }
        *tracker = next;
        Ok(())
    }
}
