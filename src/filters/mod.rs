//! Faceted product filtering: derivation of filter options, application of
//! the active selections and the price range slider

pub mod application;
pub mod debounce;
pub mod derivation;
pub mod slider;

pub use self::application::*;
pub use self::debounce::*;
pub use self::derivation::*;
pub use self::slider::*;
