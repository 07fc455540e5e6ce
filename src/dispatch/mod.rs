//! Fan-out of one action across many accounts
//!
//! # Architecture
//!
//! ```text
//! selector ──► AccountRegistry::select ──► [Account, Account, ...]
//!                                              │ action(account), one per account
//!                                              ▼
//!                                   join (every account finished)
//!                                              │
//!                                              ▼
//!                          AccountResults { name -> payload | "error: ..." }
//!                                              │ optional reducer
//!                                              ▼
//!                                       final output
//! ```
//!
//! A failing action never aborts the batch: its error becomes the string
//! value of that account's entry. A failing reducer fails the whole call.

mod results;

pub use results::{to_pretty_json, AccountOutcome, AccountResults, DispatchOutput};

use futures_util::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::account::{Account, AccountRegistry, AccountSelector};
use crate::common::errors::Result;

/// How accounts are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// All accounts at once, joined before returning
    #[default]
    Concurrent,
    /// One account after another
    Sequential,
}

impl DispatchMode {
    pub fn from_parallel(parallel: bool) -> Self {
        if parallel {
            DispatchMode::Concurrent
        } else {
            DispatchMode::Sequential
        }
    }
}

/// Runs actions over the accounts of a registry
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<AccountRegistry>,
    mode: DispatchMode,
}

impl Dispatcher {
    pub fn new(registry: Arc<AccountRegistry>) -> Self {
        Self {
            registry,
            mode: DispatchMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    /// Run `action` once per selected account and collect every outcome
    ///
    /// Only account selection can fail the call; action errors are recorded
    /// per account.
    pub async fn dispatch<T, F, Fut>(
        &self,
        selector: &AccountSelector,
        action: F,
    ) -> Result<AccountResults<T>>
    where
        F: Fn(Arc<Account>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let accounts = self.registry.select(selector)?;
        debug!(
            accounts = accounts.len(),
            mode = ?self.mode,
            "dispatching action"
        );

        let outcomes = match self.mode {
            DispatchMode::Concurrent => {
                join_all(accounts.into_iter().map(|account| {
                    let fut = action(account.clone());
                    async move { (account.name().to_string(), fut.await) }
                }))
                .await
            }
            DispatchMode::Sequential => {
                let mut outcomes = Vec::with_capacity(accounts.len());
                for account in accounts {
                    let result = action(account.clone()).await;
                    outcomes.push((account.name().to_string(), result));
                }
                outcomes
            }
        };

        let mut results = AccountResults::new();
        for (name, result) in outcomes {
            if let Err(err) = &result {
                warn!(account = %name, error = %err, "action failed");
            }
            results.insert(name, result);
        }
        Ok(results)
    }

    /// Run `action` on every selected account, then reduce the complete
    /// result map once
    pub async fn dispatch_reduce<T, U, F, Fut, R>(
        &self,
        selector: &AccountSelector,
        action: F,
        reducer: R,
    ) -> Result<U>
    where
        F: Fn(Arc<Account>) -> Fut,
        Fut: Future<Output = Result<T>>,
        R: FnOnce(AccountResults<T>) -> Result<U>,
    {
        let results = self.dispatch(selector, action).await?;
        reducer(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::ClientError;
    use crate::common::traits::MockExchangeApi;
    use crate::common::types::Balance;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn account_with_balance(name: &str, free: Decimal) -> Account {
        let mut exchange = MockExchangeApi::new();
        exchange
            .expect_get_balances()
            .returning(move || Ok(vec![Balance::new("BTC", free, dec!(0))]));
        Account::new(name, Arc::new(exchange))
    }

    fn failing_account(name: &str) -> Account {
        let mut exchange = MockExchangeApi::new();
        exchange.expect_get_balances().returning(|| {
            Err(ClientError::Api {
                code: -2015,
                msg: "Invalid API-key".to_string(),
            })
        });
        Account::new(name, Arc::new(exchange))
    }

    fn registry() -> Arc<AccountRegistry> {
        let mut registry = AccountRegistry::new();
        registry.insert(account_with_balance("a", dec!(1))).unwrap();
        registry.insert(failing_account("b")).unwrap();
        registry.insert(account_with_balance("c", dec!(3))).unwrap();
        Arc::new(registry)
    }

    async fn free_btc(account: Arc<Account>) -> Result<Decimal> {
        let balances = account.list_balances().await?;
        Ok(balances["BTC"].free)
    }

    #[tokio::test]
    async fn test_failure_is_isolated() {
        for mode in [DispatchMode::Concurrent, DispatchMode::Sequential] {
            let dispatcher = Dispatcher::new(registry()).with_mode(mode);
            let results = dispatcher
                .dispatch(&AccountSelector::All, free_btc)
                .await
                .unwrap();

            assert_eq!(results.len(), 3);
            assert_eq!(results.get("a").and_then(AccountOutcome::value), Some(&dec!(1)));
            assert_eq!(results.get("c").and_then(AccountOutcome::value), Some(&dec!(3)));
            assert_eq!(
                results.get("b").and_then(AccountOutcome::error),
                Some("error: API error -2015: Invalid API-key")
            );
        }
    }

    #[tokio::test]
    async fn test_named_selection() {
        let dispatcher = Dispatcher::new(registry());
        let results = dispatcher
            .dispatch(&AccountSelector::Named("c".to_string()), free_btc)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.get("c").unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_unknown_account_fails_whole_call() {
        let dispatcher = Dispatcher::new(registry());
        let result = dispatcher
            .dispatch(&AccountSelector::Named("zz".to_string()), free_btc)
            .await;
        assert!(matches!(result, Err(ClientError::AccountNotFound(_))));
    }

    #[tokio::test]
    async fn test_reducer_sees_complete_map() {
        let dispatcher = Dispatcher::new(registry());
        let total = dispatcher
            .dispatch_reduce(&AccountSelector::All, free_btc, |results| {
                assert_eq!(results.len(), 3);
                Ok(results.successes().map(|(_, v)| *v).sum::<Decimal>())
            })
            .await
            .unwrap();
        assert_eq!(total, dec!(4));
    }

    #[tokio::test]
    async fn test_reducer_error_propagates() {
        let dispatcher = Dispatcher::new(registry());
        let result: Result<()> = dispatcher
            .dispatch_reduce(&AccountSelector::All, free_btc, |_| {
                Err(ClientError::Reducer("boom".to_string()))
            })
            .await;
        assert!(matches!(result, Err(ClientError::Reducer(_))));
    }

    #[tokio::test]
    async fn test_slow_account_times_out_alone() {
        struct Hung;

        #[async_trait::async_trait]
        impl crate::common::traits::ExchangeApi for Hung {
            async fn get_balances(&self) -> Result<Vec<Balance>> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(vec![])
            }
            async fn get_symbols(
                &self,
            ) -> Result<std::collections::BTreeMap<String, crate::common::types::SymbolInfo>> {
                unimplemented!()
            }
            async fn list_prices(
                &self,
                _symbol: Option<String>,
            ) -> Result<Vec<crate::common::types::SymbolPrice>> {
                unimplemented!()
            }
            async fn list_open_orders(
                &self,
                _symbol: Option<String>,
            ) -> Result<Vec<crate::common::types::Order>> {
                unimplemented!()
            }
            async fn list_all_orders(
                &self,
                _symbol: String,
                _limit: Option<u32>,
            ) -> Result<Vec<crate::common::types::Order>> {
                unimplemented!()
            }
            async fn list_trades(
                &self,
                _symbol: String,
                _limit: Option<u32>,
            ) -> Result<Vec<crate::common::types::Trade>> {
                unimplemented!()
            }
            async fn cancel_order(&self, _symbol: String, _order_id: i64) -> Result<()> {
                unimplemented!()
            }
            async fn create_order(
                &self,
                _request: crate::common::types::OrderRequest,
            ) -> Result<i64> {
                unimplemented!()
            }
            async fn test_create_order(
                &self,
                _request: crate::common::types::OrderRequest,
            ) -> Result<()> {
                unimplemented!()
            }
            async fn get_margin_account(&self) -> Result<crate::common::types::MarginAccount> {
                unimplemented!()
            }
        }

        let mut registry = AccountRegistry::new();
        registry
            .insert(Account::new("hung", Arc::new(Hung)).with_timeout(Duration::from_millis(50)))
            .unwrap();
        registry.insert(account_with_balance("ok", dec!(2))).unwrap();

        let dispatcher = Dispatcher::new(Arc::new(registry));
        let results = dispatcher
            .dispatch(&AccountSelector::All, free_btc)
            .await
            .unwrap();

        assert_eq!(results.get("ok").and_then(AccountOutcome::value), Some(&dec!(2)));
        let error = results.get("hung").and_then(AccountOutcome::error).unwrap();
        assert!(error.contains("timed out"), "unexpected error: {error}");
    }
}
