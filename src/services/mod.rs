//! Services is a core layer for the app business logic: page loading,
//! filtering and the product cards with their favorites and cart markers

pub mod catalog;
pub mod observable;
pub mod product_card;
pub mod types;

pub use self::catalog::*;
pub use self::observable::*;
pub use self::product_card::*;
pub use self::types::*;
