//! Models contains all structures that are used in different
//! modules of the app

pub mod filter_option;
pub mod filter_state;
pub mod membership;
pub mod product;
pub mod validation_rules;

pub use self::filter_option::*;
pub use self::filter_state::*;
pub use self::membership::*;
pub use self::product::*;
pub use self::validation_rules::*;
