//! Category registry.
//!
//! Categories are looked up by a string id derived from their name
//! (`"Makan Siang"` → `makan-siang`). Transactions keep the id only, so a
//! deleted category degrades to the [`UNKNOWN_LABEL`] sentinel at render time.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use tracing::warn;

use crate::{EngineError, ResultEngine, TransactionKind};

/// Label shown for a category id that is not in the registry.
pub const UNKNOWN_LABEL: &str = "Unknown";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the id of a new category from its display name.
    pub fn from_name(name: &str) -> Self {
        let slug = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase();
        Self(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CategoryId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

struct CategoryIdVisitor;

impl de::Visitor<'_> for CategoryIdVisitor {
    type Value = CategoryId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a category id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<CategoryId, E> {
        Ok(CategoryId::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<CategoryId, E> {
        Ok(CategoryId::new(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<CategoryId, E> {
        Ok(CategoryId::new(v.to_string()))
    }
}

// Older stores and the legacy backend used numeric category ids.
impl<'de> Deserialize<'de> for CategoryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CategoryIdVisitor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(alias = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

/// Input for a new category. The id is derived from `name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(alias = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub icon: String,
}

impl NewCategory {
    /// Trims the name and rejects an empty one.
    pub fn validated(self) -> ResultEngine<Self> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::MissingField("name".to_string()));
        }
        Ok(Self { name, ..self })
    }

    pub fn into_category(self) -> Category {
        Category {
            id: CategoryId::from_name(&self.name),
            name: self.name,
            kind: self.kind,
            color: self.color,
            icon: self.icon,
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    pub name: Option<String>,
    #[serde(alias = "type")]
    pub kind: Option<TransactionKind>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl CategoryUpdate {
    pub fn apply_to(self, category: &mut Category) -> ResultEngine<()> {
        if let Some(name) = self.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(EngineError::MissingField("name".to_string()));
            }
            category.name = name.to_string();
        }
        if let Some(kind) = self.kind {
            category.kind = kind;
        }
        if let Some(color) = self.color {
            category.color = color;
        }
        if let Some(icon) = self.icon {
            category.icon = icon;
        }
        Ok(())
    }
}

fn seed(id: &str, name: &str, kind: TransactionKind, color: &str, icon: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        kind,
        color: color.to_string(),
        icon: icon.to_string(),
    }
}

/// The category set shipped with a fresh install.
pub fn default_categories() -> Vec<Category> {
    use TransactionKind::{Expense, Income};

    vec![
        seed("salary", "Gaji", Income, "#4CAF50", "💰"),
        seed("freelance", "Freelance", Income, "#2196F3", "💼"),
        seed("investment", "Investasi", Income, "#FF9800", "📈"),
        seed("food", "Makanan", Expense, "#f44336", "🍔"),
        seed("transport", "Transport", Expense, "#9C27B0", "🚗"),
        seed("entertainment", "Hiburan", Expense, "#E91E63", "🎬"),
        seed("shopping", "Belanja", Expense, "#FF5722", "🛒"),
        seed("bills", "Tagihan", Expense, "#795548", "📋"),
        seed("other", "Lainnya", Expense, "#607D8B", "📦"),
    ]
}

/// Ordered set of categories, unique by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryRegistry {
    items: Vec<Category>,
}

impl CategoryRegistry {
    /// Builds a registry, keeping the first occurrence of a duplicated id.
    pub fn new(categories: Vec<Category>) -> Self {
        let mut items: Vec<Category> = Vec::with_capacity(categories.len());
        for category in categories {
            if items.iter().any(|c| c.id == category.id) {
                warn!(id = %category.id, name = %category.name, "duplicate category id, keeping the first");
                continue;
            }
            items.push(category);
        }
        Self { items }
    }

    pub fn with_defaults() -> Self {
        Self::new(default_categories())
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &CategoryId) -> Option<&Category> {
        self.items.iter().find(|c| &c.id == id)
    }

    /// Display name for `id`, or [`UNKNOWN_LABEL`] when the id is not registered.
    pub fn label(&self, id: &CategoryId) -> &str {
        self.get(id).map_or(UNKNOWN_LABEL, |c| c.name.as_str())
    }

    pub fn of_kind(&self, kind: TransactionKind) -> impl Iterator<Item = &Category> {
        self.items.iter().filter(move |c| c.kind == kind)
    }

    pub fn insert(&mut self, input: NewCategory) -> ResultEngine<&Category> {
        let category = input.validated()?.into_category();
        if self.get(&category.id).is_some() {
            return Err(EngineError::ExistingKey(category.id.to_string()));
        }
        self.items.push(category);
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn update(&mut self, id: &CategoryId, update: CategoryUpdate) -> ResultEngine<&Category> {
        let category = self
            .items
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        update.apply_to(category)?;
        Ok(&*category)
    }

    pub fn remove(&mut self, id: &CategoryId) -> ResultEngine<Category> {
        let index = self
            .items
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
        Ok(self.items.remove(index))
    }

    pub fn into_vec(self) -> Vec<Category> {
        self.items
    }
}
