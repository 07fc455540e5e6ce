//! Order sizing: percentage-of-balance quantities snapped to lot sizes

mod engine;
mod lot_size;
mod symbols;

pub use engine::{OrderSizer, QuantityInput};
pub use lot_size::{normalize, normalize_with_filter};
pub use symbols::{SymbolCache, SymbolTable};
