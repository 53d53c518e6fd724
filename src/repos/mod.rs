//! Repos is a module responsible for talking to the external collaborators:
//! the product source, the remote documents service and the local device storage
pub mod documents;
pub mod membership;
pub mod products;
pub mod types;

pub use self::documents::*;
pub use self::membership::*;
pub use self::products::*;
pub use self::types::*;
