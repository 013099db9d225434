//! Application state and the intent reducer.
//!
//! [`Tracker`] owns everything the tracker screen shows. It changes only
//! through [`Tracker::apply`]; the derived figures are recomputed wholesale by
//! [`Tracker::view`] after each intent.

use tracing::debug;

use crate::{
    Breakdown, Category, CategoryRegistry, OpeningBalance, ResultEngine, Summary,
    Transaction, TransactionFilter, TransactionStore, expense_breakdown, summarize,
};

/// Which data tier is authoritative for this session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tier {
    #[default]
    Remote,
    Local,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Local => "local",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    AddTransaction(Transaction),
    DeleteTransaction(i64),
    SetFilter(TransactionFilter),
    SetOpeningBalance(OpeningBalance),
    ReplaceCategories(Vec<Category>),
    ReplaceTransactions(Vec<Transaction>),
    SetTier(Tier),
    /// Drops every transaction and resets the opening balance.
    ClearAll,
}

impl Intent {
    fn name(&self) -> &'static str {
        match self {
            Self::AddTransaction(_) => "add_transaction",
            Self::DeleteTransaction(_) => "delete_transaction",
            Self::SetFilter(_) => "set_filter",
            Self::SetOpeningBalance(_) => "set_opening_balance",
            Self::ReplaceCategories(_) => "replace_categories",
            Self::ReplaceTransactions(_) => "replace_transactions",
            Self::SetTier(_) => "set_tier",
            Self::ClearAll => "clear_all",
        }
    }
}

/// Derived figures for one render pass.
#[derive(Debug, PartialEq, Eq)]
pub struct View<'a> {
    pub summary: Summary,
    pub visible: Vec<&'a Transaction>,
    pub breakdown: Breakdown,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tracker {
    categories: CategoryRegistry,
    transactions: TransactionStore,
    opening_balance: OpeningBalance,
    filter: TransactionFilter,
    tier: Tier,
}

impl Tracker {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            ..Self::default()
        }
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn opening_balance(&self) -> OpeningBalance {
        self.opening_balance
    }

    pub fn filter(&self) -> &TransactionFilter {
        &self.filter
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Id for a locally created transaction, given the current time in ms.
    pub fn next_local_id(&self, now_ms: i64) -> i64 {
        self.transactions.next_id(now_ms)
    }

    /// Applies one intent. On error the state is left exactly as it was.
    pub fn apply(&mut self, intent: Intent) -> ResultEngine<()> {
        debug!(intent = intent.name(), "applying intent");
        match intent {
            Intent::AddTransaction(transaction) => self.transactions.push(transaction)?,
            Intent::DeleteTransaction(id) => {
                self.transactions.remove(id)?;
            }
            Intent::SetFilter(filter) => self.filter = filter,
            Intent::SetOpeningBalance(balance) => self.opening_balance = balance,
            Intent::ReplaceCategories(categories) => {
                self.categories = CategoryRegistry::new(categories);
            }
            Intent::ReplaceTransactions(transactions) => {
                transactions.iter().try_for_each(Transaction::check)?;
                self.transactions = TransactionStore::new(transactions);
            }
            Intent::SetTier(tier) => self.tier = tier,
            Intent::ClearAll => {
                self.transactions.clear();
                self.opening_balance = OpeningBalance::ZERO;
            }
        }
        Ok(())
    }

    /// Summary and chart cover every transaction; only the table is filtered.
    pub fn view(&self) -> View<'_> {
        let all = self.transactions.as_slice();
        View {
            summary: summarize(all, self.opening_balance),
            visible: self.filter.project(all),
            breakdown: expense_breakdown(all, &self.categories),
        }
    }

    /// Display name of a transaction's category, or the unknown sentinel.
    pub fn label_of(&self, transaction: &Transaction) -> &str {
        self.categories.label(&transaction.category_id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{CategoryId, EngineError, Money, TransactionKind, UNKNOWN_LABEL};

    fn tx(id: i64, kind: TransactionKind, major: i64, category: &str) -> Transaction {
        Transaction {
            id,
            kind,
            amount: Money::from_major(major),
            category_id: CategoryId::new(category),
            description: "x".to_string(),
            occurred_on: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    fn tracker() -> Tracker {
        let mut tracker = Tracker::new(Tier::Local);
        tracker
            .apply(Intent::ReplaceCategories(crate::default_categories()))
            .unwrap();
        tracker
    }

    #[test]
    fn add_then_view() {
        let mut tracker = tracker();
        tracker
            .apply(Intent::SetOpeningBalance(
                OpeningBalance::new(Money::from_major(1_000_000)).unwrap(),
            ))
            .unwrap();
        tracker
            .apply(Intent::AddTransaction(tx(1, TransactionKind::Income, 500_000, "salary")))
            .unwrap();
        tracker
            .apply(Intent::AddTransaction(tx(2, TransactionKind::Expense, 200_000, "food")))
            .unwrap();

        let view = tracker.view();
        assert_eq!(view.summary.balance, Money::from_major(1_300_000));
        assert_eq!(view.visible.len(), 2);
        assert_eq!(view.breakdown.total(), Money::from_major(200_000));
    }

    #[test]
    fn zero_amount_leaves_state_unchanged() {
        let mut tracker = tracker();
        let before = tracker.clone();
        let zero = tx(1, TransactionKind::Expense, 0, "food");
        assert!(matches!(
            tracker.apply(Intent::AddTransaction(zero)),
            Err(EngineError::InvalidAmount(_))
        ));
        assert_eq!(tracker, before);
    }

    #[test]
    fn delete_equals_never_added() {
        let mut tracker = tracker();
        tracker
            .apply(Intent::AddTransaction(tx(1, TransactionKind::Income, 10, "salary")))
            .unwrap();
        let before = tracker.view().summary;

        tracker
            .apply(Intent::AddTransaction(tx(2, TransactionKind::Expense, 4, "food")))
            .unwrap();
        tracker.apply(Intent::DeleteTransaction(2)).unwrap();
        assert_eq!(tracker.view().summary, before);
        assert!(tracker.apply(Intent::DeleteTransaction(2)).is_err());
    }

    #[test]
    fn filter_only_narrows_the_table() {
        let mut tracker = tracker();
        tracker
            .apply(Intent::AddTransaction(tx(1, TransactionKind::Income, 10, "salary")))
            .unwrap();
        tracker
            .apply(Intent::AddTransaction(tx(2, TransactionKind::Expense, 4, "food")))
            .unwrap();
        tracker
            .apply(Intent::SetFilter(
                TransactionFilter::from_inputs("food", "").unwrap(),
            ))
            .unwrap();

        let view = tracker.view();
        assert_eq!(view.visible.len(), 1);
        assert_eq!(view.summary.total_income, Money::from_major(10));
    }

    #[test]
    fn deleted_category_renders_unknown() {
        let mut tracker = tracker();
        tracker
            .apply(Intent::AddTransaction(tx(1, TransactionKind::Expense, 4, "gone")))
            .unwrap();
        assert_eq!(tracker.label_of(&tracker.transactions()[0]), UNKNOWN_LABEL);
    }

    #[test]
    fn clear_all_resets_balance() {
        let mut tracker = tracker();
        tracker
            .apply(Intent::SetOpeningBalance(
                OpeningBalance::new(Money::from_major(5)).unwrap(),
            ))
            .unwrap();
        tracker
            .apply(Intent::AddTransaction(tx(1, TransactionKind::Income, 10, "salary")))
            .unwrap();
        tracker.apply(Intent::ClearAll).unwrap();
        assert!(tracker.transactions().is_empty());
        assert_eq!(tracker.view().summary.balance, Money::ZERO);
    }
}
