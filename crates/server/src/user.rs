//! Users table and its endpoints.
//!
//! Users carry no credentials; the API is open.

use api_types::user::{User, UserNew, UserUpdate};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{EngineError, Role, UserStatus};
use sea_orm::{ActiveValue, QueryOrder, entity::prelude::*};

use crate::{ServerError, server::ServerState};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub role: String,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn map_user(model: Model) -> Result<User, EngineError> {
    let corrupted = |field: &str, value: &str| {
        EngineError::Corrupted(format!("user {} has {field} {value}", model.id))
    };
    let role = Role::try_from(model.role.as_str()).map_err(|_| corrupted("role", &model.role))?;
    let status =
        UserStatus::try_from(model.status.as_str()).map_err(|_| corrupted("status", &model.status))?;
    Ok(User {
        id: model.id,
        name: model.name,
        email: model.email,
        role,
        status,
    })
}

pub(crate) async fn count(db: &DatabaseConnection) -> Result<u64, DbErr> {
    Entity::find().count(db).await
}

async fn find(db: &DatabaseConnection, id: i64) -> Result<Model, ServerError> {
    Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("user {id}")).into())
}

async fn email_taken(db: &DatabaseConnection, email: &str, except: Option<i64>) -> Result<bool, DbErr> {
    let mut query = Entity::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(Column::Id.ne(id));
    }
    Ok(query.one(db).await?.is_some())
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<User>>, ServerError> {
    let users = Entity::find()
        .order_by_asc(Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(map_user)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(users))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ServerError> {
    Ok(Json(map_user(find(&state.db, id).await?)?))
}

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<UserNew>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ServerError> {
    let Json(payload) = payload.map_err(|err| ServerError::Generic(err.body_text()))?;
    let input = payload.validated()?;
    if email_taken(&state.db, &input.email, None).await? {
        return Err(EngineError::ExistingKey(input.email).into());
    }

    let model = ActiveModel {
        id: ActiveValue::NotSet,
        name: ActiveValue::Set(input.name),
        email: ActiveValue::Set(input.email),
        role: ActiveValue::Set(input.role.as_str().to_string()),
        status: ActiveValue::Set(input.status.as_str().to_string()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(id = model.id, "user created");
    Ok((StatusCode::CREATED, Json(map_user(model)?)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<Json<User>, ServerError> {
    let Json(payload) = payload.map_err(|err| ServerError::Generic(err.body_text()))?;
    let mut active: ActiveModel = find(&state.db, id).await?.into();

    if let Some(name) = payload.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::MissingField("name".to_string()).into());
        }
        active.name = ActiveValue::Set(name.to_string());
    }
    if let Some(email) = payload.email {
        let email = email.trim();
        if email.is_empty() {
            return Err(EngineError::MissingField("email".to_string()).into());
        }
        if email_taken(&state.db, email, Some(id)).await? {
            return Err(EngineError::ExistingKey(email.to_string()).into());
        }
        active.email = ActiveValue::Set(email.to_string());
    }
    if let Some(role) = payload.role {
        active.role = ActiveValue::Set(role.as_str().to_string());
    }
    if let Some(status) = payload.status {
        active.status = ActiveValue::Set(status.as_str().to_string());
    }

    let model = active.update(&state.db).await?;
    Ok(Json(map_user(model)?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    let result = Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(EngineError::KeyNotFound(format!("user {id}")).into());
    }
    tracing::info!(id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
