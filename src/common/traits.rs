//! Trait definitions for exchange clients

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::errors::Result;
use super::types::{
    Balance, MarginAccount, Order, OrderRequest, SymbolInfo, SymbolPrice, Trade,
};

/// Capabilities of one authenticated exchange session
///
/// Every account in the registry owns one implementation. The account facade
/// wraps each call in its own timeout, so implementations only need to report
/// transport failures as errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Spot balances of every asset held by the account
    async fn get_balances(&self) -> Result<Vec<Balance>>;

    /// Trading rules of every listed symbol, keyed by symbol
    async fn get_symbols(&self) -> Result<BTreeMap<String, SymbolInfo>>;

    /// Latest price of one symbol, or of all symbols when `None`
    async fn list_prices(&self, symbol: Option<String>) -> Result<Vec<SymbolPrice>>;

    /// Open orders of one symbol, or of all symbols when `None`
    async fn list_open_orders(&self, symbol: Option<String>) -> Result<Vec<Order>>;

    /// Order history of a symbol
    async fn list_all_orders(&self, symbol: String, limit: Option<u32>) -> Result<Vec<Order>>;

    /// Trade history of a symbol
    async fn list_trades(&self, symbol: String, limit: Option<u32>) -> Result<Vec<Trade>>;

    /// Cancel one open order
    async fn cancel_order(&self, symbol: String, order_id: i64) -> Result<()>;

    /// Place a GTC limit order, returning the exchange order id
    async fn create_order(&self, request: OrderRequest) -> Result<i64>;

    /// Validate a limit order without placing it
    async fn test_create_order(&self, request: OrderRequest) -> Result<()>;

    /// Cross margin account snapshot
    async fn get_margin_account(&self) -> Result<MarginAccount>;
}
