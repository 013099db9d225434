//! Transaction primitives.
//!
//! A [`Transaction`] records one income or expense against a category. Once
//! stored it is immutable locally: the only mutation is deletion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{CategoryId, EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    #[serde(rename = "INCOME", alias = "income")]
    Income,
    #[serde(rename = "EXPENSE", alias = "expense")]
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }

    /// Human label used by the front-ends.
    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            _ => Err(EngineError::InvalidKind(value.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    #[serde(alias = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    #[serde(alias = "category")]
    pub category_id: CategoryId,
    pub description: String,
    #[serde(alias = "transactionDate", alias = "date")]
    pub occurred_on: NaiveDate,
}

/// Why `amount` cannot be a transaction amount, if it cannot.
fn amount_problem(amount: Money) -> Option<&'static str> {
    if !amount.is_positive() {
        Some("amount must be greater than 0")
    } else if !amount.within_entry_limit() {
        Some("amount too large")
    } else {
        None
    }
}

impl Transaction {
    /// Checks a transaction that did not come through [`NewTransaction::new`],
    /// e.g. one read back from storage, a backup or the remote service.
    pub fn check(&self) -> ResultEngine<()> {
        match amount_problem(self.amount) {
            Some(problem) => Err(EngineError::InvalidAmount(format!(
                "transaction {}: {problem}",
                self.id
            ))),
            None => Ok(()),
        }
    }

    /// Builds a stored transaction from validated input and the id assigned
    /// by the owning store.
    pub fn new(id: i64, input: NewTransaction) -> Self {
        Self {
            id,
            kind: input.kind,
            amount: input.amount,
            category_id: input.category_id,
            description: input.description,
            occurred_on: input.occurred_on,
        }
    }
}

/// A validated transaction that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(alias = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    #[serde(alias = "category")]
    pub category_id: CategoryId,
    pub description: String,
    #[serde(alias = "transactionDate", alias = "date")]
    pub occurred_on: NaiveDate,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        category_id: CategoryId,
        description: &str,
        occurred_on: NaiveDate,
    ) -> ResultEngine<Self> {
        if let Some(problem) = amount_problem(amount) {
            return Err(EngineError::InvalidAmount(problem.to_string()));
        }
        if category_id.as_str().trim().is_empty() {
            return Err(EngineError::MissingField("category".to_string()));
        }
        let description = description.trim();
        if description.is_empty() {
            return Err(EngineError::MissingField("description".to_string()));
        }

        Ok(Self {
            kind,
            amount,
            category_id,
            description: description.to_string(),
            occurred_on,
        })
    }
}

/// Raw form input for a new transaction, as typed by the user.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionDraft {
    pub kind: String,
    pub amount: String,
    pub category: String,
    pub description: String,
    /// `YYYY-MM-DD`; empty means `today`.
    pub date: String,
}

impl TransactionDraft {
    /// Validates the draft.
    ///
    /// Every required field is checked before the draft can reach a store, so
    /// a rejected draft never mutates anything.
    pub fn parse(&self, today: NaiveDate) -> ResultEngine<NewTransaction> {
        if self.kind.trim().is_empty() {
            return Err(EngineError::MissingField("type".to_string()));
        }
        let kind = TransactionKind::try_from(self.kind.as_str())?;

        if self.amount.trim().is_empty() {
            return Err(EngineError::MissingField("amount".to_string()));
        }
        let amount: Money = self.amount.parse()?;

        if self.category.trim().is_empty() {
            return Err(EngineError::MissingField("category".to_string()));
        }

        let occurred_on = parse_date(&self.date)?.unwrap_or(today);

        NewTransaction::new(
            kind,
            amount,
            CategoryId::new(self.category.trim()),
            &self.description,
            occurred_on,
        )
    }
}

/// Parses a `YYYY-MM-DD` date; empty input yields `None`.
pub fn parse_date(value: &str) -> ResultEngine<Option<NaiveDate>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| EngineError::InvalidDate(format!("{value} (expected YYYY-MM-DD)")))
}

/// Ordered collection of transactions, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionStore {
    items: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new(items: Vec<Transaction>) -> Self {
        Self { items }
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Transaction> {
        self.items.iter().find(|t| t.id == id)
    }

    /// Appends a transaction, rejecting invalid amounts and duplicate ids.
    pub fn push(&mut self, transaction: Transaction) -> ResultEngine<()> {
        if let Some(problem) = amount_problem(transaction.amount) {
            return Err(EngineError::InvalidAmount(problem.to_string()));
        }
        if self.get(transaction.id).is_some() {
            return Err(EngineError::ExistingKey(transaction.id.to_string()));
        }
        self.items.push(transaction);
        Ok(())
    }

    pub fn remove(&mut self, id: i64) -> ResultEngine<Transaction> {
        let index = self
            .items
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Smallest id strictly greater than `candidate` and every stored id.
    ///
    /// Local ids are creation timestamps in milliseconds; two entries created
    /// in the same millisecond still get distinct ids.
    pub fn next_id(&self, candidate: i64) -> i64 {
        let max = self.items.iter().map(|t| t.id).max().unwrap_or(i64::MIN);
        candidate.max(max.saturating_add(1))
    }

    pub fn into_vec(self) -> Vec<Transaction> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn draft(amount: &str) -> TransactionDraft {
        TransactionDraft {
            kind: "expense".to_string(),
            amount: amount.to_string(),
            category: "food".to_string(),
            description: "  lunch ".to_string(),
            date: String::new(),
        }
    }

    #[test]
    fn kind_parses_any_case() {
        assert_eq!(TransactionKind::try_from("income").unwrap(), TransactionKind::Income);
        assert_eq!(TransactionKind::try_from("EXPENSE").unwrap(), TransactionKind::Expense);
        assert_eq!(
            TransactionKind::try_from("transfer"),
            Err(EngineError::InvalidKind("transfer".to_string()))
        );
    }

    #[test]
    fn draft_trims_and_defaults_date() {
        let parsed = draft("50.000").parse(day()).unwrap();
        assert_eq!(parsed.kind, TransactionKind::Expense);
        assert_eq!(parsed.amount, Money::from_major(50_000));
        assert_eq!(parsed.description, "lunch");
        assert_eq!(parsed.occurred_on, day());
    }

    #[test]
    fn draft_rejects_zero_amount() {
        let err = draft("0").parse(day()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert!(err.is_validation());
    }

    #[test]
    fn draft_rejects_missing_fields() {
        let mut input = draft("10");
        input.description = "   ".to_string();
        assert_eq!(
            input.parse(day()),
            Err(EngineError::MissingField("description".to_string()))
        );

        let mut input = draft("10");
        input.category.clear();
        assert_eq!(
            input.parse(day()),
            Err(EngineError::MissingField("category".to_string()))
        );
    }

    #[test]
    fn draft_rejects_bad_date() {
        let mut input = draft("10");
        input.date = "01/05/2024".to_string();
        assert!(matches!(input.parse(day()), Err(EngineError::InvalidDate(_))));
    }

    #[test]
    fn store_push_and_remove() {
        let mut store = TransactionStore::default();
        let input = draft("10").parse(day()).unwrap();
        store.push(Transaction::new(1, input.clone())).unwrap();
        assert_eq!(
            store.push(Transaction::new(1, input)),
            Err(EngineError::ExistingKey("1".to_string()))
        );
        assert_eq!(store.len(), 1);

        assert_eq!(store.remove(1).unwrap().id, 1);
        assert_eq!(store.remove(1), Err(EngineError::KeyNotFound("1".to_string())));
        assert!(store.is_empty());
    }

    #[test]
    fn check_flags_amounts_that_bypassed_validation() {
        let mut stored = Transaction::new(9, draft("10").parse(day()).unwrap());
        assert_eq!(stored.check(), Ok(()));

        stored.amount = Money::ZERO;
        assert!(matches!(
            stored.check(),
            Err(EngineError::InvalidAmount(msg)) if msg.starts_with("transaction 9")
        ));

        stored.amount = Money::new(Money::MAX_ENTRY.minor() + 1);
        assert!(stored.check().is_err());
        assert!(TransactionStore::default().push(stored).is_err());
    }

    #[test]
    fn new_transaction_accepts_up_to_the_entry_cap() {
        let food = CategoryId::new("food");
        let at_cap = NewTransaction::new(
            TransactionKind::Income,
            Money::MAX_ENTRY,
            food.clone(),
            "bonus",
            day(),
        );
        assert!(at_cap.is_ok());
        assert!(matches!(
            NewTransaction::new(
                TransactionKind::Income,
                Money::new(Money::MAX_ENTRY.minor() + 1),
                food,
                "bonus",
                day()
            ),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn next_id_is_monotonic() {
        let mut store = TransactionStore::default();
        let input = draft("10").parse(day()).unwrap();
        store.push(Transaction::new(100, input)).unwrap();
        assert_eq!(store.next_id(50), 101);
        assert_eq!(store.next_id(500), 500);
    }

    #[test]
    fn reads_legacy_field_names() {
        let json = r#"{"id":7,"type":"expense","amount":30000,"category":"transport",
            "description":"bus","transactionDate":"2024-05-02"}"#;
        let parsed: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, TransactionKind::Expense);
        assert_eq!(parsed.category_id, CategoryId::new("transport"));
        assert_eq!(parsed.amount, Money::from_major(30_000));
    }
}
