//! Defines some common functions used in this library.

/// Defines the default parameters and numerical tolerances.
pub mod constants;

/// Defines some useful functions such as inner products.
pub mod utils;

/// Defines some checker functions.
pub(crate) mod checker;
