//! Favorites and cart membership records
use std::fmt;

use chrono::{DateTime, Utc};

use models::{Product, ProductId};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-user product list
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Favorites,
    Cart,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ListKind::Favorites => write!(f, "favorites"),
            ListKind::Cart => write!(f, "cart"),
        }
    }
}

/// Membership of a product in a list. Favorites always carry quantity 1.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MembershipRecord {
    pub product_id: ProductId,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl MembershipRecord {
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
            added_at: Utc::now(),
        }
    }
}

/// Product as rendered on a card, with its favorite and cart markers
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ProductCard {
    pub product: Product,
    pub is_favorite: bool,
    pub cart_quantity: u32,
}
