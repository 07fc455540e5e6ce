//! Reducers that fold per-account results into cross-account totals
//!
//! Only successful results of the expected shape count towards a total;
//! failed accounts and other payloads contribute nothing. Sums use exact
//! decimals, so the order accounts are visited in does not matter.

mod payload;

pub use payload::{AccountBalances, AccountPayload, MarginView};

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::common::errors::{ClientError, Result};
use crate::config::types::LockedBalances;
use crate::dispatch::AccountResults;

/// Asset -> summed amount
pub type BalanceTotals = BTreeMap<String, Decimal>;

fn checked_add(total: Decimal, amount: Decimal, what: &str) -> Result<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| ClientError::Reducer(format!("{what} overflowed")))
}

/// Sum `free + locked` per asset over every account's balances, minus what
/// the locked-balance table declares as reserved for that account
pub fn balance_totals(
    results: &AccountResults<AccountPayload>,
    locked: &LockedBalances,
) -> Result<BalanceTotals> {
    let mut totals = BalanceTotals::new();
    for (account, payload) in results.successes() {
        let balances = match payload {
            AccountPayload::Balances(balances) => balances,
            AccountPayload::Margin(_)
            | AccountPayload::Orders(_)
            | AccountPayload::Prices(_)
            | AccountPayload::Canceled(_)
            | AccountPayload::OrderPlaced(_)
            | AccountPayload::OrderTested(_)
            | AccountPayload::Symbols(_)
            | AccountPayload::Symbol(_)
            | AccountPayload::Trades(_) => continue,
        };

        for balance in &balances.balances {
            let entry = totals.entry(balance.asset.clone()).or_default();
            let mut sum = checked_add(*entry, balance.free, &balance.asset)?;
            sum = checked_add(sum, balance.locked, &balance.asset)?;
            if let Some(reserved) = locked.get(account, &balance.asset) {
                sum = sum.checked_sub(reserved).ok_or_else(|| {
                    ClientError::Reducer(format!("{} overflowed", balance.asset))
                })?;
            }
            *entry = sum;
        }
    }
    Ok(totals)
}

/// Per-asset sums over margin accounts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginAssetTotals {
    pub borrowed: Decimal,
    pub free: Decimal,
    pub interest: Decimal,
    pub locked: Decimal,
    pub net_asset: Decimal,
}

/// Margin totals across accounts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarginTotals {
    #[serde(rename = "TotalAssetOfBTC")]
    pub total_asset_of_btc: Decimal,
    #[serde(rename = "TotalLiabilityOfBTC")]
    pub total_liability_of_btc: Decimal,
    #[serde(rename = "TotalNetAssetOfBTC")]
    pub total_net_asset_of_btc: Decimal,
    #[serde(rename = "UserAssets")]
    pub user_assets: BTreeMap<String, MarginAssetTotals>,
}

/// Sum the BTC valuations and every user asset field over margin accounts
pub fn margin_totals(results: &AccountResults<AccountPayload>) -> Result<MarginTotals> {
    let mut totals = MarginTotals::default();
    for (_, payload) in results.successes() {
        let margin = match payload {
            AccountPayload::Margin(view) => &view.margin,
            AccountPayload::Balances(_)
            | AccountPayload::Orders(_)
            | AccountPayload::Prices(_)
            | AccountPayload::Canceled(_)
            | AccountPayload::OrderPlaced(_)
            | AccountPayload::OrderTested(_)
            | AccountPayload::Symbols(_)
            | AccountPayload::Symbol(_)
            | AccountPayload::Trades(_) => continue,
        };

        totals.total_asset_of_btc = checked_add(
            totals.total_asset_of_btc,
            margin.total_asset_of_btc,
            "TotalAssetOfBTC",
        )?;
        totals.total_liability_of_btc = checked_add(
            totals.total_liability_of_btc,
            margin.total_liability_of_btc,
            "TotalLiabilityOfBTC",
        )?;
        totals.total_net_asset_of_btc = checked_add(
            totals.total_net_asset_of_btc,
            margin.total_net_asset_of_btc,
            "TotalNetAssetOfBTC",
        )?;

        for asset in &margin.user_assets {
            let entry = totals.user_assets.entry(asset.asset.clone()).or_default();
            entry.borrowed = checked_add(entry.borrowed, asset.borrowed, &asset.asset)?;
            entry.free = checked_add(entry.free, asset.free, &asset.asset)?;
            entry.interest = checked_add(entry.interest, asset.interest, &asset.asset)?;
            entry.locked = checked_add(entry.locked, asset.locked, &asset.asset)?;
            entry.net_asset = checked_add(entry.net_asset, asset.net_asset, &asset.asset)?;
        }
    }
    Ok(totals)
}
