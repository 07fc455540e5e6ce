//! Binance Accounts Library
//!
//! Runs balance, order, price and symbol operations across many Binance
//! accounts at once, collecting per-account results without letting one
//! account's failure hide the others, and sizes percentage orders onto the
//! exchange's lot grid with exact decimal arithmetic.

pub mod account;
pub mod actions;
pub mod aggregate;
pub mod binance;
pub mod common;
pub mod config;
pub mod dispatch;
pub mod sizing;

// Re-export commonly used types
pub use account::{Account, AccountRegistry, AccountSelector};
pub use actions::{
    ActionContext, BalanceQuery, CancelRequest, MarginQuery, NewOrder, OrderQuery, TradeQuery,
};
pub use aggregate::{AccountPayload, BalanceTotals, MarginTotals};
pub use binance::BinanceRestClient;
pub use common::errors::{ClientError, Result};
pub use common::traits::ExchangeApi;
pub use common::types::{Balance, LotSize, Side, SymbolInfo};
pub use config::types::{AppConfig, LockedBalances};
pub use dispatch::{AccountOutcome, AccountResults, DispatchMode, DispatchOutput, Dispatcher};
pub use sizing::{normalize, OrderSizer, SymbolCache};
