use rust_decimal::Decimal;
use std::sync::Arc;

use super::ActionContext;
use crate::account::{select_assets, Account, AccountSelector};
use crate::aggregate::{
    balance_totals, margin_totals, AccountBalances, AccountPayload, BalanceTotals, MarginTotals,
    MarginView,
};
use crate::common::errors::Result;
use crate::common::types::UserAsset;
use crate::dispatch::DispatchOutput;

/// Arguments of list-balance
#[derive(Debug, Clone)]
pub struct BalanceQuery {
    /// Assets to show, in this order; empty shows every asset
    pub assets: Vec<String>,
    /// Append the cross-account totals
    pub total: bool,
}

/// Arguments of list-margin-balance
#[derive(Debug, Clone)]
pub struct MarginQuery {
    pub assets: Vec<String>,
    pub total: bool,
    /// `Some(true)` keeps borrowed assets, `Some(false)` keeps the others
    pub borrowed: Option<bool>,
}

fn keep_borrowed(asset: &UserAsset, borrowed: Option<bool>) -> bool {
    match borrowed {
        None => true,
        Some(true) => asset.borrowed > Decimal::ZERO,
        Some(false) => asset.borrowed.is_zero(),
    }
}

async fn account_balances(account: Arc<Account>, assets: Vec<String>) -> Result<AccountPayload> {
    let balances = account.update_balances(&assets).await?;
    Ok(AccountPayload::Balances(AccountBalances {
        name: account.name().to_string(),
        balances,
    }))
}

async fn account_margin(
    account: Arc<Account>,
    assets: Vec<String>,
    borrowed: Option<bool>,
) -> Result<AccountPayload> {
    let mut margin = account.margin_account().await?;
    let user_assets: Vec<UserAsset> = margin
        .user_assets
        .into_iter()
        .filter(|asset| keep_borrowed(asset, borrowed))
        .collect();
    margin.user_assets = select_assets(user_assets, &assets, |a| &a.asset);
    Ok(AccountPayload::Margin(MarginView {
        name: account.name().to_string(),
        margin,
    }))
}

impl ActionContext {
    /// Spot balances of every selected account, optionally with totals
    pub async fn list_balances(
        &self,
        selector: &AccountSelector,
        query: BalanceQuery,
    ) -> Result<DispatchOutput<AccountPayload, BalanceTotals>> {
        let BalanceQuery { assets, total } = query;
        let locked = self.locked.clone();

        self.dispatcher
            .dispatch_reduce(
                selector,
                move |account| account_balances(account, assets.clone()),
                move |results| {
                    if !total {
                        return Ok(DispatchOutput::Results(results));
                    }
                    let totals = balance_totals(&results, &locked)?;
                    Ok(DispatchOutput::Aggregated(results, totals))
                },
            )
            .await
    }

    /// Margin accounts of every selected account, optionally with totals
    pub async fn list_margin_balances(
        &self,
        selector: &AccountSelector,
        query: MarginQuery,
    ) -> Result<DispatchOutput<AccountPayload, MarginTotals>> {
        let MarginQuery {
            assets,
            total,
            borrowed,
        } = query;

        self.dispatcher
            .dispatch_reduce(
                selector,
                move |account| account_margin(account, assets.clone(), borrowed),
                move |results| {
                    if !total {
                        return Ok(DispatchOutput::Results(results));
                    }
                    let totals = margin_totals(&results)?;
                    Ok(DispatchOutput::Aggregated(results, totals))
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn user_asset(borrowed: Decimal) -> UserAsset {
        UserAsset {
            asset: "BTC".to_string(),
            borrowed,
            free: dec!(1),
            interest: dec!(0),
            locked: dec!(0),
            net_asset: dec!(1),
        }
    }

    #[test]
    fn test_keep_borrowed() {
        let borrowed = user_asset(dec!(0.1));
        let clean = user_asset(dec!(0));

        assert!(keep_borrowed(&borrowed, None));
        assert!(keep_borrowed(&clean, None));
        assert!(keep_borrowed(&borrowed, Some(true)));
        assert!(!keep_borrowed(&clean, Some(true)));
        assert!(!keep_borrowed(&borrowed, Some(false)));
        assert!(keep_borrowed(&clean, Some(false)));
    }
}
