use crate::model::category::Category;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Dense index of a card inside a [`Registry`](crate::model::registry::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub(crate) u16);

impl CardId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Immutable card identity. Equality and hashing use `(name, category)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub category: Category,
}

impl Card {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }

    /// External identifier used by snapshots and the guess log: `"<name> (<category>)"`.
    pub fn key(&self) -> String {
        format!("{} ({})", self.name, self.category)
    }

    /// Splits a `"<name> (<category>)"` key back into its parts.
    pub fn parse_key(key: &str) -> Option<(&str, Category)> {
        let trimmed = key.trim();
        let open = trimmed.rfind(" (")?;
        let inner = trimmed[open + 2..].strip_suffix(')')?;
        let category = inner.parse().ok()?;
        Some((&trimmed[..open], category))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
