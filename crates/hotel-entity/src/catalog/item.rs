//! Purchasable catalog item (bar drink).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use hotel_core::types::{CatalogItemId, Money};

/// A purchasable item.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CatalogItem {
    /// Unique item identifier.
    pub id: CatalogItemId,
    /// Display name.
    pub name: String,
    /// Menu category (cocktail, beer, wine...).
    pub category: Option<String>,
    /// Current price. Copied onto order lines at purchase time.
    pub price: Money,
    /// Whether the item can currently be ordered.
    pub available: bool,
    /// When the item was created.
    pub created_at: DateTime<Utc>,
    /// When the item was last updated.
    pub updated_at: DateTime<Utc>,
}
