//! Filter/view projection over the transaction sequence.

use serde::{Deserialize, Serialize};

use crate::{CategoryId, ResultEngine, Transaction, TransactionKind};

/// Optional `(category, kind)` predicate pair. An absent field matches
/// everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub category: Option<CategoryId>,
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    /// Builds a filter from raw UI inputs; an empty string means "all".
    pub fn from_inputs(category: &str, kind: &str) -> ResultEngine<Self> {
        let category = category.trim();
        let kind = kind.trim();
        Ok(Self {
            category: (!category.is_empty()).then(|| CategoryId::new(category)),
            kind: if kind.is_empty() {
                None
            } else {
                Some(TransactionKind::try_from(kind)?)
            },
        })
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.kind.is_none()
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.category
            .as_ref()
            .is_none_or(|c| c == &transaction.category_id)
            && self.kind.is_none_or(|k| k == transaction.kind)
    }

    /// Matching transactions in their original order.
    pub fn project<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|t| self.matches(t)).collect()
    }
}
