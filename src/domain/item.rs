//! Item Entity
//!
//! A secondhand good listed by a user. Read-only inside the wishlist core.

use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::user::UserId;

/// Stable identifier of a listed item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Wear condition tag shown next to an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Condition {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "gently used")]
    GentlyUsed,
    #[serde(rename = "used")]
    Used,
    /// Any tag the storefront does not know about
    #[default]
    #[serde(rename = "unknown", other)]
    Unknown,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::GentlyUsed => "gently used",
            Condition::Used => "used",
            Condition::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "new" => Condition::New,
            "gently used" => Condition::GentlyUsed,
            "used" => Condition::Used,
            _ => Condition::Unknown,
        }
    }
}

/// A listed item as returned by item storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier
    #[serde(alias = "_id")]
    pub id: ItemId,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Asking price in USD
    pub price: f64,
    /// Image URL
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub condition: Condition,
    /// Seller
    #[serde(default)]
    pub owner_id: Option<UserId>,
    #[serde(default)]
    pub is_available_for_swap: bool,
}

impl Item {
    /// Create an item with only the fields the wishlist needs
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            thumbnail: None,
            condition: Condition::Unknown,
            owner_id: None,
            is_available_for_swap: false,
        }
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
