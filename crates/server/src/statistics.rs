//! Statistics API endpoints

use api_types::stats::{Statistic, StatisticQuery};
use axum::{
    Json,
    extract::{Query, State},
};
use engine::{Analytics, BreakdownEntry, OpeningBalance, expense_breakdown, summarize};

use crate::{ServerError, categories, server::ServerState, transactions, user};

/// Ledger totals over every stored transaction.
pub async fn get_stats(
    State(state): State<ServerState>,
    Query(query): Query<StatisticQuery>,
) -> Result<Json<Statistic>, ServerError> {
    let opening = match query.opening_balance {
        Some(amount) => OpeningBalance::new(amount)?,
        None => OpeningBalance::ZERO,
    };
    let transactions = transactions::all(&state.db).await?;
    Ok(Json(summarize(&transactions, opening)))
}

/// Expense totals per category label, in first-encountered order.
pub async fn get_breakdown(
    State(state): State<ServerState>,
) -> Result<Json<Vec<BreakdownEntry>>, ServerError> {
    let transactions = transactions::all(&state.db).await?;
    let registry = categories::registry(&state.db).await?;
    Ok(Json(
        expense_breakdown(&transactions, &registry).entries().to_vec(),
    ))
}

/// Admin dashboard figures.
pub async fn get_analytics(
    State(state): State<ServerState>,
) -> Result<Json<Analytics>, ServerError> {
    let transactions = transactions::all(&state.db).await?;
    let registry = categories::registry(&state.db).await?;
    let users = usize::try_from(user::count(&state.db).await?).unwrap_or(usize::MAX);
    Ok(Json(Analytics::compute(&transactions, &registry, users)))
}
