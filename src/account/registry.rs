//! Registry of configured accounts

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::Account;
use crate::binance::BinanceRestClient;
use crate::common::errors::{ClientError, Result};
use crate::config::types::{AccountKey, AppSettings};

/// Which accounts an action runs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSelector {
    /// Every configured account
    All,
    /// Exactly the named account
    Named(String),
    /// A single account, the first by name; for commands whose answer does
    /// not depend on the account
    First,
}

impl AccountSelector {
    /// `--name` given selects that account, otherwise all of them
    pub fn from_name(name: Option<String>) -> Self {
        match name {
            Some(name) if !name.is_empty() => AccountSelector::Named(name),
            _ => AccountSelector::All,
        }
    }
}

/// Accounts known for this run, keyed by their unique name
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: BTreeMap<String, Arc<Account>>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one Binance-backed account per key file entry
    pub fn from_keys(keys: &[AccountKey], settings: &AppSettings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.request_timeout_seconds);
        let mut registry = Self::new();
        for key in keys {
            let client = BinanceRestClient::from_settings(key, settings)?;
            registry.insert(Account::new(&key.name, Arc::new(client)).with_timeout(timeout))?;
        }
        info!("Loaded {} accounts", registry.len());
        Ok(registry)
    }

    /// Add an account; names must be unique
    pub fn insert(&mut self, account: Account) -> Result<()> {
        if self.accounts.contains_key(account.name()) {
            return Err(ClientError::Configuration(format!(
                "duplicate account name {}",
                account.name()
            )));
        }
        self.accounts
            .insert(account.name().to_string(), Arc::new(account));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<Account>> {
        self.accounts.get(name).cloned()
    }

    /// Resolve a selector to the accounts to dispatch over
    pub fn select(&self, selector: &AccountSelector) -> Result<Vec<Arc<Account>>> {
        match selector {
            AccountSelector::All => Ok(self.accounts.values().cloned().collect()),
            AccountSelector::Named(name) => self
                .get(name)
                .map(|account| vec![account])
                .ok_or_else(|| ClientError::AccountNotFound(name.clone())),
            AccountSelector::First => Ok(self.accounts.values().take(1).cloned().collect()),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.accounts.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
