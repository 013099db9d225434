//! Categories API endpoints.

use api_types::category::{Category, CategoryNew, CategoryUpdate};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{CategoryId, EngineError, TransactionKind};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub color: String,
    pub icon: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn map_category(model: Model) -> Result<Category, EngineError> {
    let kind = TransactionKind::try_from(model.kind.as_str()).map_err(|_| {
        EngineError::Corrupted(format!("category {} has kind {}", model.id, model.kind))
    })?;
    Ok(Category {
        id: CategoryId::new(model.id),
        name: model.name,
        kind,
        color: model.color,
        icon: model.icon,
    })
}

fn map_all(models: Vec<Model>) -> Result<Vec<Category>, EngineError> {
    models.into_iter().map(map_category).collect()
}

pub(crate) async fn exists(db: &DatabaseConnection, id: &str) -> Result<bool, DbErr> {
    Ok(Entity::find_by_id(id.to_string()).one(db).await?.is_some())
}

/// Every registered category, used by the ledger to resolve labels.
pub(crate) async fn registry(db: &DatabaseConnection) -> Result<engine::CategoryRegistry, ServerError> {
    let categories = map_all(Entity::find().all(db).await?)?;
    Ok(engine::CategoryRegistry::new(categories))
}

async fn find(db: &DatabaseConnection, id: &str) -> Result<Model, ServerError> {
    Entity::find_by_id(id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("category {id}")).into())
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Category>>, ServerError> {
    let categories = map_all(Entity::find().all(&state.db).await?)?;
    Ok(Json(categories))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Category>, ServerError> {
    Ok(Json(map_category(find(&state.db, &id).await?)?))
}

pub async fn by_type(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Category>>, ServerError> {
    let kind = TransactionKind::try_from(kind.as_str())?;
    let categories = Entity::find()
        .filter(Column::Kind.eq(kind.as_str()))
        .all(&state.db)
        .await?;
    Ok(Json(map_all(categories)?))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<CategoryNew>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ServerError> {
    let Json(payload) = payload.map_err(|err| ServerError::Generic(err.body_text()))?;
    let category = payload.validated()?.into_category();
    if exists(&state.db, category.id.as_str()).await? {
        return Err(EngineError::ExistingKey(category.id.to_string()).into());
    }

    let model = ActiveModel {
        id: ActiveValue::Set(category.id.to_string()),
        name: ActiveValue::Set(category.name.clone()),
        kind: ActiveValue::Set(category.kind.as_str().to_string()),
        color: ActiveValue::Set(category.color.clone()),
        icon: ActiveValue::Set(category.icon.clone()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(id = %model.id, "category created");
    Ok((StatusCode::CREATED, Json(map_category(model)?)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Result<Json<CategoryUpdate>, JsonRejection>,
) -> Result<Json<Category>, ServerError> {
    let Json(payload) = payload.map_err(|err| ServerError::Generic(err.body_text()))?;
    let model = find(&state.db, &id).await?;
    let mut category = map_category(model.clone())?;
    payload.apply_to(&mut category)?;

    let mut active: ActiveModel = model.into();
    active.name = ActiveValue::Set(category.name.clone());
    active.kind = ActiveValue::Set(category.kind.as_str().to_string());
    active.color = ActiveValue::Set(category.color.clone());
    active.icon = ActiveValue::Set(category.icon.clone());
    active.update(&state.db).await?;

    Ok(Json(category))
}

/// Transactions keep pointing at a deleted id and render as unknown.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    let result = Entity::delete_by_id(id.clone()).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(EngineError::KeyNotFound(format!("category {id}")).into());
    }
    tracing::info!(%id, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}
