//! Core types for Spice Hub.
//!
//! Type-safe wrappers for IDs, statuses, and money.

pub mod id;
pub mod money;
pub mod status;

pub use id::*;
pub use money::{
    CURRENCY, DEFAULT_ADD_QUANTITY, GRAMS_PER_UNIT, format_grams, format_ksh, grams_to_units,
};
pub use status::*;
