//! Derived figures: totals, balance and the expense breakdown.
//!
//! Everything here is recomputed from the full transaction sequence on every
//! read; nothing keeps a running total.

use serde::{Deserialize, Serialize};

use crate::{CategoryRegistry, EngineError, Money, ResultEngine, Transaction, TransactionKind};

/// Balance the user starts from. Never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OpeningBalance(Money);

impl OpeningBalance {
    pub const ZERO: OpeningBalance = OpeningBalance(Money::ZERO);

    pub fn new(amount: Money) -> ResultEngine<Self> {
        if amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "opening balance cannot be negative".to_string(),
            ));
        }
        if !amount.within_entry_limit() {
            return Err(EngineError::InvalidAmount(
                "opening balance too large".to_string(),
            ));
        }
        Ok(Self(amount))
    }

    pub fn amount(self) -> Money {
        self.0
    }
}

impl<'de> Deserialize<'de> for OpeningBalance {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = Money::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_income: Money,
    pub total_expense: Money,
    pub balance: Money,
}

/// Totals for `transactions` starting from `opening`.
///
/// `balance = opening + income - expense`; an empty sequence yields the
/// opening balance unchanged.
pub fn summarize(transactions: &[Transaction], opening: OpeningBalance) -> Summary {
    let (total_income, total_expense) =
        transactions
            .iter()
            .fold((Money::ZERO, Money::ZERO), |(income, expense), t| match t.kind {
                TransactionKind::Income => (income + t.amount, expense),
                TransactionKind::Expense => (income, expense + t.amount),
            });

    Summary {
        total_income,
        total_expense,
        balance: opening.amount() + total_income - total_expense,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownEntry {
    pub label: String,
    pub amount: Money,
}

/// Expense totals per category, in first-encountered order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    entries: Vec<BreakdownEntry>,
}

impl Breakdown {
    pub fn entries(&self) -> &[BreakdownEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> Money {
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// The `n` largest entries, descending. Ties keep first-encountered order.
    pub fn top(&self, n: usize) -> Vec<BreakdownEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.amount.cmp(&a.amount));
        sorted.truncate(n);
        sorted
    }
}

/// Sums EXPENSE amounts per category label.
///
/// Labels come from the registry, so transactions of deleted categories are
/// grouped together under [`UNKNOWN_LABEL`](crate::UNKNOWN_LABEL).
pub fn expense_breakdown(transactions: &[Transaction], categories: &CategoryRegistry) -> Breakdown {
    let mut entries: Vec<BreakdownEntry> = Vec::new();
    for t in transactions
        .iter()
        .filter(|t| t.kind == TransactionKind::Expense)
    {
        let label = categories.label(&t.category_id);
        match entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => entry.amount += t.amount,
            None => entries.push(BreakdownEntry {
                label: label.to_string(),
                amount: t.amount,
            }),
        }
    }
    Breakdown { entries }
}

/// Admin dashboard figures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_users: usize,
    pub total_transactions: usize,
    pub average_amount: Money,
    pub top_expenses: Vec<BreakdownEntry>,
}

impl Analytics {
    pub const TOP_CATEGORIES: usize = 5;

    pub fn compute(
        transactions: &[Transaction],
        categories: &CategoryRegistry,
        total_users: usize,
    ) -> Self {
        let total: Money = transactions.iter().map(|t| t.amount).sum();
        let average_amount = match i64::try_from(transactions.len()) {
            Ok(count) if count > 0 => Money::new(total.minor() / count),
            _ => Money::ZERO,
        };

        Self {
            total_users,
            total_transactions: transactions.len(),
            average_amount,
            top_expenses: expense_breakdown(transactions, categories).top(Self::TOP_CATEGORIES),
        }
    }
}
