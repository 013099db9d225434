//! Domain core of the expense tracker.
//!
//! The crate is storage-agnostic: the server persists through its own
//! database layer, the front-ends through [`storage::LocalState`] or the
//! remote API. Everything that derives figures from transactions lives here.

pub use category::{
    Category, CategoryId, CategoryRegistry, CategoryUpdate, NewCategory, UNKNOWN_LABEL,
    default_categories,
};
pub use error::EngineError;
pub use filter::TransactionFilter;
pub use ledger::{
    Analytics, Breakdown, BreakdownEntry, OpeningBalance, Summary, expense_breakdown, summarize,
};
pub use money::Money;
pub use settings::{ChartType, Settings, ThemeMode};
pub use snapshot::Backup;
pub use state::{Intent, Tier, Tracker, View};
pub use transactions::{
    NewTransaction, Transaction, TransactionDraft, TransactionKind, TransactionStore, parse_date,
};
pub use users::{NewUser, Role, User, UserDirectory, UserStatus, default_users};

mod category;
mod error;
mod filter;
mod ledger;
mod money;
mod settings;
mod snapshot;
mod state;
pub mod storage;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
