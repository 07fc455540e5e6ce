use std::sync::Arc;

use super::ActionContext;
use crate::account::{Account, AccountSelector};
use crate::aggregate::AccountPayload;
use crate::common::errors::{ClientError, Result};
use crate::dispatch::AccountResults;
use crate::sizing::SymbolCache;

async fn account_prices(account: Arc<Account>, symbol: Option<String>) -> Result<AccountPayload> {
    let prices = account.list_prices(symbol.as_deref()).await?;
    Ok(AccountPayload::Prices(prices))
}

async fn account_symbols(
    account: Arc<Account>,
    symbols: Arc<SymbolCache>,
    symbol: Option<String>,
) -> Result<AccountPayload> {
    let table = symbols.get_or_load(&account).await?;
    match symbol {
        Some(symbol) => table
            .get(&symbol)
            .cloned()
            .map(AccountPayload::Symbol)
            .ok_or(ClientError::SymbolNotFound(symbol)),
        None => Ok(AccountPayload::Symbols(table.as_ref().clone())),
    }
}

// Market data is the same for every account, so these run on one account only.
impl ActionContext {
    /// Latest price of one symbol or of all symbols
    pub async fn list_prices(&self, symbol: Option<String>) -> Result<AccountResults<AccountPayload>> {
        self.dispatcher
            .dispatch(&AccountSelector::First, move |account| {
                account_prices(account, symbol.clone())
            })
            .await
    }

    /// Trading rules of one symbol or of all symbols
    pub async fn list_symbols(&self, symbol: Option<String>) -> Result<AccountResults<AccountPayload>> {
        let symbols = Arc::clone(&self.symbols);
        self.dispatcher
            .dispatch(&AccountSelector::First, move |account| {
                account_symbols(account, Arc::clone(&symbols), symbol.clone())
            })
            .await
    }
}
