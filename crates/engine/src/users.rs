//! Users managed from the admin console.
//!
//! There is no authentication: a user is a record with a role and a status.

use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(EngineError::InvalidValue(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl TryFrom<&str> for UserStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(EngineError::InvalidValue(format!("unknown status: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub status: UserStatus,
}

impl NewUser {
    /// Trims name and email; both are required.
    pub fn validated(self) -> ResultEngine<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::MissingField("name".to_string()));
        }
        let email = self.email.trim().to_string();
        if email.is_empty() {
            return Err(EngineError::MissingField("email".to_string()));
        }
        if !email.contains('@') {
            return Err(EngineError::InvalidValue(format!("invalid email: {email}")));
        }
        Ok(Self { name, email, ..self })
    }
}

pub fn default_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "Admin".to_string(),
            email: "admin@expensetracker.com".to_string(),
            role: Role::Admin,
            status: UserStatus::Active,
        },
        User {
            id: 2,
            name: "User Demo".to_string(),
            email: "user@expensetracker.com".to_string(),
            role: Role::User,
            status: UserStatus::Active,
        },
    ]
}

/// Users keyed by id, with unique emails.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDirectory {
    items: Vec<User>,
}

impl UserDirectory {
    pub fn new(items: Vec<User>) -> Self {
        Self { items }
    }

    pub fn as_slice(&self) -> &[User] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&User> {
        self.items.iter().find(|u| u.id == id)
    }

    /// Adds a user with the given id (or the next free one, when taken).
    pub fn insert(&mut self, id: i64, input: NewUser) -> ResultEngine<&User> {
        let input = input.validated()?;
        if self
            .items
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(EngineError::ExistingKey(input.email));
        }
        let max = self.items.iter().map(|u| u.id).max().unwrap_or(0);
        let id = if self.get(id).is_some() { max + 1 } else { id };

        self.items.push(User {
            id,
            name: input.name,
            email: input.email,
            role: input.role,
            status: input.status,
        });
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn remove(&mut self, id: i64) -> ResultEngine<User> {
        let index = self
            .items
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    pub fn into_vec(self) -> Vec<User> {
        self.items
    }
}
