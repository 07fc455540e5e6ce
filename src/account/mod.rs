//! Account facade and the registry of configured accounts
//!
//! An [`Account`] pairs a unique name with one [`ExchangeApi`] session. Every
//! call made through it is bounded by the account's own timeout, so a hung
//! exchange call surfaces as [`ClientError::Timeout`] for that account only.

mod registry;

pub use registry::{AccountRegistry, AccountSelector};

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::common::errors::{ClientError, Result};
use crate::common::traits::ExchangeApi;
use crate::common::types::{
    Balance, MarginAccount, Order, OrderRequest, SymbolInfo, SymbolPrice, Trade,
};

/// Default bound on a single exchange call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// One exchange account
pub struct Account {
    name: String,
    exchange: Arc<dyn ExchangeApi>,
    timeout: Duration,
    /// Balances seen by the last `update_balances`
    balances: RwLock<Vec<Balance>>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Account {
    pub fn new(name: impl Into<String>, exchange: Arc<dyn ExchangeApi>) -> Self {
        Self {
            name: name.into(),
            exchange,
            timeout: DEFAULT_CALL_TIMEOUT,
            balances: RwLock::new(Vec::new()),
        }
    }

    /// Bound every exchange call made through this account
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call<T, F>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        debug!(account = %self.name, operation, "exchange call");
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(format!(
                "{} did not complete within {}s",
                operation,
                self.timeout.as_secs_f64()
            ))),
        }
    }

    /// Current balances keyed by asset
    pub async fn list_balances(&self) -> Result<BTreeMap<String, Balance>> {
        let balances = self.call("get_balances", self.exchange.get_balances()).await?;
        Ok(balances
            .into_iter()
            .map(|balance| (balance.asset.clone(), balance))
            .collect())
    }

    /// Fetch balances, keep only `assets` (all when empty) and store them as
    /// the account's snapshot
    pub async fn update_balances(&self, assets: &[String]) -> Result<Vec<Balance>> {
        let balances = self.call("get_balances", self.exchange.get_balances()).await?;
        let selected = select_assets(balances, assets, |b| &b.asset);
        *self.balances.write().await = selected.clone();
        Ok(selected)
    }

    /// Snapshot stored by the last `update_balances`
    pub async fn cached_balances(&self) -> Vec<Balance> {
        self.balances.read().await.clone()
    }

    pub async fn list_symbols(&self) -> Result<BTreeMap<String, SymbolInfo>> {
        self.call("get_symbols", self.exchange.get_symbols()).await
    }

    pub async fn list_prices(&self, symbol: Option<&str>) -> Result<Vec<SymbolPrice>> {
        self.call(
            "list_prices",
            self.exchange.list_prices(symbol.map(str::to_string)),
        )
        .await
    }

    pub async fn list_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>> {
        self.call(
            "list_open_orders",
            self.exchange.list_open_orders(symbol.map(str::to_string)),
        )
        .await
    }

    pub async fn list_all_orders(&self, symbol: &str, limit: Option<u32>) -> Result<Vec<Order>> {
        self.call(
            "list_all_orders",
            self.exchange.list_all_orders(symbol.to_string(), limit),
        )
        .await
    }

    pub async fn list_trades(&self, symbol: &str, limit: Option<u32>) -> Result<Vec<Trade>> {
        self.call(
            "list_trades",
            self.exchange.list_trades(symbol.to_string(), limit),
        )
        .await
    }

    pub async fn cancel_order(&self, symbol: &str, order_id: i64) -> Result<()> {
        self.call(
            "cancel_order",
            self.exchange.cancel_order(symbol.to_string(), order_id),
        )
        .await
    }

    pub async fn create_order(&self, request: OrderRequest) -> Result<i64> {
        self.call("create_order", self.exchange.create_order(request))
            .await
    }

    pub async fn test_create_order(&self, request: OrderRequest) -> Result<()> {
        self.call("test_create_order", self.exchange.test_create_order(request))
            .await
    }

    pub async fn margin_account(&self) -> Result<MarginAccount> {
        self.call("get_margin_account", self.exchange.get_margin_account())
            .await
    }
}

/// Keep the items whose asset is listed, in the order the assets are listed,
/// at most once per asset. An empty list keeps everything.
pub fn select_assets<T, F>(items: Vec<T>, assets: &[String], asset_of: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T) -> &String,
{
    if assets.is_empty() {
        return items;
    }

    let by_asset: BTreeMap<&String, &T> = items.iter().map(|item| (asset_of(item), item)).collect();
    let mut seen = HashSet::new();
    assets
        .iter()
        .filter(|asset| seen.insert(*asset))
        .filter_map(|asset| by_asset.get(asset).map(|item| (*item).clone()))
        .collect()
}
