//! JSON bodies exchanged with the REST service.
//!
//! Resources themselves ([`engine::Category`], [`engine::Transaction`],
//! [`engine::User`]) travel as-is; this crate holds the request bodies and the
//! few response shapes that are not domain records.

use serde::{Deserialize, Serialize};

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub mod category {
    pub use engine::{Category, CategoryUpdate, NewCategory as CategoryNew};
}

pub mod user {
    use super::*;

    pub use engine::{NewUser as UserNew, User};
    use engine::{Role, UserStatus};

    /// Partial update; absent fields keep their current value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
        pub role: Option<Role>,
        pub status: Option<UserStatus>,
    }
}

pub mod transaction {
    use super::*;
    use chrono::NaiveDate;
    use engine::{CategoryId, Money, TransactionKind};

    pub use engine::{NewTransaction as TransactionNew, Transaction};

    /// Partial update. Only fields that are present and valid are applied.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpdate {
        #[serde(alias = "type")]
        pub kind: Option<TransactionKind>,
        pub amount: Option<Money>,
        #[serde(alias = "category")]
        pub category_id: Option<CategoryId>,
        pub description: Option<String>,
        #[serde(alias = "transactionDate", alias = "date")]
        pub occurred_on: Option<NaiveDate>,
    }
}

pub mod stats {
    use super::*;

    pub use engine::Summary as Statistic;

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StatisticQuery {
        pub opening_balance: Option<engine::Money>,
    }
}
