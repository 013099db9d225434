//! Transactions API endpoints.

use api_types::transaction::{Transaction, TransactionNew, TransactionUpdate};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::NaiveDate;
use engine::{CategoryId, EngineError, Money, NewTransaction, TransactionKind};
use sea_orm::{ActiveValue, QueryOrder, entity::prelude::*};

use crate::{ServerError, categories, server::ServerState};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: String,
    pub amount_minor: i64,
    pub category_id: String,
    pub description: String,
    pub occurred_on: NaiveDate,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn map_transaction(model: Model) -> Result<Transaction, EngineError> {
    let kind = TransactionKind::try_from(model.kind.as_str()).map_err(|_| {
        EngineError::Corrupted(format!("transaction {} has kind {}", model.id, model.kind))
    })?;
    Ok(Transaction {
        id: model.id,
        kind,
        amount: Money::new(model.amount_minor),
        category_id: CategoryId::new(model.category_id),
        description: model.description,
        occurred_on: model.occurred_on,
    })
}

fn map_all(models: Vec<Model>) -> Result<Vec<Transaction>, EngineError> {
    models.into_iter().map(map_transaction).collect()
}

/// All transactions in insertion order.
pub(crate) async fn all(db: &DatabaseConnection) -> Result<Vec<Transaction>, ServerError> {
    let models = Entity::find().order_by_asc(Column::Id).all(db).await?;
    Ok(map_all(models)?)
}

async fn find(db: &DatabaseConnection, id: i64) -> Result<Model, ServerError> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")).into())
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Transaction>>, ServerError> {
    Ok(Json(all(&state.db).await?))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, ServerError> {
    Ok(Json(map_transaction(find(&state.db, id).await?)?))
}

pub async fn by_type(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let kind = TransactionKind::try_from(kind.as_str())?;
    let models = Entity::find()
        .filter(Column::Kind.eq(kind.as_str()))
        .order_by_asc(Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(map_all(models)?))
}

pub async fn by_category(
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    let models = Entity::find()
        .filter(Column::CategoryId.eq(category_id))
        .order_by_asc(Column::Id)
        .all(&state.db)
        .await?;
    Ok(Json(map_all(models)?))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<TransactionNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), ServerError> {
    let Json(payload) = payload.map_err(|err| ServerError::Generic(err.body_text()))?;
    let input = NewTransaction::new(
        payload.kind,
        payload.amount,
        payload.category_id,
        &payload.description,
        payload.occurred_on,
    )?;
    if !categories::exists(&state.db, input.category_id.as_str()).await? {
        return Err(
            EngineError::InvalidValue(format!("unknown category: {}", input.category_id)).into(),
        );
    }

    let model = ActiveModel {
        id: ActiveValue::NotSet,
        kind: ActiveValue::Set(input.kind.as_str().to_string()),
        amount_minor: ActiveValue::Set(input.amount.minor()),
        category_id: ActiveValue::Set(input.category_id.to_string()),
        description: ActiveValue::Set(input.description),
        occurred_on: ActiveValue::Set(input.occurred_on),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(id = model.id, kind = %model.kind, "transaction created");
    Ok((StatusCode::CREATED, Json(map_transaction(model)?)))
}

/// Applies the fields that are present and valid; anything else is kept.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Result<Json<Transaction>, ServerError> {
    let Json(payload) = payload.map_err(|err| ServerError::Generic(err.body_text()))?;
    let mut active: ActiveModel = find(&state.db, id).await?.into();

    if let Some(amount) = payload.amount
        && amount.is_positive()
    {
        active.amount_minor = ActiveValue::Set(amount.minor());
    }
    if let Some(kind) = payload.kind {
        active.kind = ActiveValue::Set(kind.as_str().to_string());
    }
    if let Some(category_id) = payload.category_id
        && !category_id.as_str().trim().is_empty()
    {
        active.category_id = ActiveValue::Set(category_id.to_string());
    }
    if let Some(description) = payload.description
        && !description.trim().is_empty()
    {
        active.description = ActiveValue::Set(description.trim().to_string());
    }
    if let Some(occurred_on) = payload.occurred_on {
        active.occurred_on = ActiveValue::Set(occurred_on);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(map_transaction(model)?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    let result = Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(EngineError::KeyNotFound(format!("transaction {id}")).into());
    }
    tracing::info!(id, "transaction deleted");
    Ok(StatusCode::NO_CONTENT)
}
