//! Configuration types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
    /// Balances reserved by other systems, per account
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

impl AppConfig {
    /// Build the locked-balance override table from the account sections
    pub fn locked_balances(&self) -> LockedBalances {
        LockedBalances::from_accounts(&self.accounts)
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Base URL of the spot REST API
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Base URL of the margin (sapi) REST API
    #[serde(default = "default_rest_url")]
    pub margin_url: String,
    /// Timeout applied to every exchange call, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// recvWindow sent with signed requests, in milliseconds
    #[serde(default = "default_recv_window")]
    pub recv_window_ms: u64,
    /// Run accounts concurrently instead of one after another
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Assets listed by list-balance when none are given
    #[serde(default = "default_assets")]
    pub default_assets: Vec<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            rest_url: default_rest_url(),
            margin_url: default_rest_url(),
            request_timeout_seconds: default_request_timeout(),
            recv_window_ms: default_recv_window(),
            parallel: default_parallel(),
            default_assets: default_assets(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rest_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_recv_window() -> u64 {
    5000
}

fn default_parallel() -> bool {
    true
}

fn default_assets() -> Vec<String> {
    vec!["BTC".to_string(), "BNB".to_string(), "USDT".to_string()]
}

/// Per-account section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    pub name: String,
    #[serde(default)]
    pub balances: Vec<LockedBalanceEntry>,
}

/// Balance declared in the config file; only `locked` is used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockedBalanceEntry {
    pub asset: String,
    #[serde(default)]
    pub free: Option<Decimal>,
    #[serde(default)]
    pub locked: Option<Decimal>,
}

/// Amounts reserved elsewhere, account name -> asset -> locked amount
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockedBalances {
    table: HashMap<String, HashMap<String, Decimal>>,
}

impl LockedBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_accounts(accounts: &[AccountConfig]) -> Self {
        let mut table = Self::new();
        for account in accounts {
            for entry in &account.balances {
                if let Some(locked) = entry.locked {
                    table.insert(&account.name, &entry.asset, locked);
                }
            }
        }
        table
    }

    pub fn insert(&mut self, account: &str, asset: &str, locked: Decimal) {
        self.table
            .entry(account.to_string())
            .or_default()
            .insert(asset.to_string(), locked);
    }

    /// Declared locked amount, if the account declares one for the asset
    pub fn get(&self, account: &str, asset: &str) -> Option<Decimal> {
        self.table.get(account)?.get(asset).copied()
    }

    /// Declared locked amount, zero when absent
    pub fn locked(&self, account: &str, asset: &str) -> Decimal {
        self.get(account, asset).unwrap_or(Decimal::ZERO)
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// API key pair of one account, as stored in the key file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountKey {
    pub name: String,
    pub api_key: String,
    pub secret_key: String,
}
