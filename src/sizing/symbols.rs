//! Lazily loaded symbol metadata shared by every account of a run

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::account::Account;
use crate::common::errors::{ClientError, Result};
use crate::common::types::SymbolInfo;

/// Symbol rules keyed by symbol
pub type SymbolTable = BTreeMap<String, SymbolInfo>;

/// Single-flight cache of the exchange's symbol table
///
/// The first caller loads the table through its account while holding the
/// lock; concurrent callers wait and then share the same snapshot. A failed
/// load leaves the cache empty so the next caller retries.
#[derive(Debug, Default)]
pub struct SymbolCache {
    table: Mutex<Option<Arc<SymbolTable>>>,
}

impl SymbolCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-populated with a known table
    pub fn with_table(table: SymbolTable) -> Self {
        Self {
            table: Mutex::new(Some(Arc::new(table))),
        }
    }

    /// Return the cached table, loading it through `account` on first use
    pub async fn get_or_load(&self, account: &Account) -> Result<Arc<SymbolTable>> {
        let mut guard = self.table.lock().await;
        if let Some(table) = guard.as_ref() {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(account.list_symbols().await?);
        info!(
            symbols = table.len(),
            account = %account.name(),
            "Loaded symbol table"
        );
        *guard = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Rules of one symbol
    pub async fn lookup(&self, account: &Account, symbol: &str) -> Result<SymbolInfo> {
        let table = self.get_or_load(account).await?;
        table
            .get(symbol)
            .cloned()
            .ok_or_else(|| ClientError::SymbolNotFound(symbol.to_string()))
    }

    /// Drop the cached table; the next lookup reloads it
    pub async fn invalidate(&self) {
        *self.table.lock().await = None;
    }

    pub async fn is_loaded(&self) -> bool {
        self.table.lock().await.is_some()
    }
}
