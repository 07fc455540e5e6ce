//! Common types, errors and traits shared across the crate

pub mod decimal;
pub mod errors;
pub mod traits;
pub mod types;
