//! Default categories and demo users for a fresh database.

use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

use crate::m20260101_000001_init::{Categories, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

const CATEGORIES: [(&str, &str, &str, &str, &str); 9] = [
    ("salary", "Gaji", "INCOME", "#4CAF50", "💰"),
    ("freelance", "Freelance", "INCOME", "#2196F3", "💼"),
    ("investment", "Investasi", "INCOME", "#FF9800", "📈"),
    ("food", "Makanan", "EXPENSE", "#f44336", "🍔"),
    ("transport", "Transport", "EXPENSE", "#9C27B0", "🚗"),
    ("entertainment", "Hiburan", "EXPENSE", "#E91E63", "🎬"),
    ("shopping", "Belanja", "EXPENSE", "#FF5722", "🛒"),
    ("bills", "Tagihan", "EXPENSE", "#795548", "📋"),
    ("other", "Lainnya", "EXPENSE", "#607D8B", "📦"),
];

const USERS: [(&str, &str, &str); 2] = [
    ("Admin", "admin@expensetracker.com", "admin"),
    ("User Demo", "user@expensetracker.com", "user"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        let mut stmt = Query::insert()
            .into_table(Categories::Table)
            .columns([
                Categories::Id,
                Categories::Name,
                Categories::Kind,
                Categories::Color,
                Categories::Icon,
            ])
            .to_owned();
        for (id, name, kind, color, icon) in CATEGORIES {
            stmt.values_panic([
                id.into(),
                name.into(),
                kind.into(),
                color.into(),
                icon.into(),
            ]);
        }
        db.execute(backend.build(&stmt)).await?;

        let mut stmt = Query::insert()
            .into_table(Users::Table)
            .columns([Users::Name, Users::Email, Users::Role, Users::Status])
            .to_owned();
        for (name, email, role) in USERS {
            stmt.values_panic([name.into(), email.into(), role.into(), "active".into()]);
        }
        db.execute(backend.build(&stmt)).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        let stmt = Query::delete()
            .from_table(Categories::Table)
            .and_where(Expr::col(Categories::Id).is_in(CATEGORIES.map(|(id, ..)| id)))
            .to_owned();
        db.execute(backend.build(&stmt)).await?;

        let stmt = Query::delete()
            .from_table(Users::Table)
            .and_where(Expr::col(Users::Email).is_in(USERS.map(|(_, email, _)| email)))
            .to_owned();
        db.execute(backend.build(&stmt)).await?;

        Ok(())
    }
}
