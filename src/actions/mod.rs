//! One entry point per command
//!
//! Each action builds the per-account closure, hands it to the
//! [`Dispatcher`] and, where the command supports totals, the reducer.

mod balances;
mod market;
mod orders;

pub use balances::{BalanceQuery, MarginQuery};
pub use orders::{CancelRequest, NewOrder, OrderQuery, TradeQuery};

use std::sync::Arc;

use crate::config::types::LockedBalances;
use crate::dispatch::Dispatcher;
use crate::sizing::{OrderSizer, SymbolCache};

/// Shared state of one run: the dispatcher, the locked-balance table and the
/// symbol cache used for order sizing
#[derive(Debug, Clone)]
pub struct ActionContext {
    dispatcher: Dispatcher,
    locked: Arc<LockedBalances>,
    symbols: Arc<SymbolCache>,
}

impl ActionContext {
    pub fn new(dispatcher: Dispatcher, locked: LockedBalances) -> Self {
        Self {
            dispatcher,
            locked: Arc::new(locked),
            symbols: Arc::new(SymbolCache::new()),
        }
    }

    /// Reuse an existing symbol cache
    pub fn with_symbol_cache(mut self, symbols: Arc<SymbolCache>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn symbols(&self) -> &Arc<SymbolCache> {
        &self.symbols
    }

    fn sizer(&self) -> OrderSizer {
        OrderSizer::new(Arc::clone(&self.symbols), Arc::clone(&self.locked))
    }
}
