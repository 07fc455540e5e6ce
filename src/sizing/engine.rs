use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use super::lot_size::normalize_with_filter;
use super::symbols::SymbolCache;
use crate::account::Account;
use crate::common::decimal::{is_percentage, parse_decimal, parse_percentage, round_half_up};
use crate::common::errors::{ClientError, Result};
use crate::common::types::Side;
use crate::config::types::LockedBalances;

/// Quantity requested on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityInput {
    /// Exact quantity, sent as given
    Absolute(Decimal),
    /// Share of the available balance, as a fraction (`50%` is `0.5`)
    Percent(Decimal),
}

impl FromStr for QuantityInput {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        if is_percentage(s) {
            Ok(QuantityInput::Percent(parse_percentage(s)?))
        } else {
            Ok(QuantityInput::Absolute(parse_decimal(s)?))
        }
    }
}

/// Turns "N% of my balance" into a quantity the exchange accepts
///
/// Balances reserved elsewhere (the locked-balance table) are deducted before
/// the percentage is applied.
#[derive(Debug, Clone)]
pub struct OrderSizer {
    symbols: Arc<SymbolCache>,
    locked: Arc<LockedBalances>,
}

impl OrderSizer {
    pub fn new(symbols: Arc<SymbolCache>, locked: Arc<LockedBalances>) -> Self {
        Self { symbols, locked }
    }

    /// Quantity to order on `account`
    ///
    /// SELL takes the share of the base asset. BUY takes the share of the
    /// quote asset and converts it at `price`, rounded to the base asset
    /// precision. Either way the result is snapped to the symbol's lot size.
    pub async fn size_order(
        &self,
        account: &Account,
        symbol: &str,
        side: Side,
        quantity: &str,
        price: Decimal,
    ) -> Result<Decimal> {
        let pct = match quantity.parse::<QuantityInput>()? {
            QuantityInput::Absolute(qty) => return Ok(qty),
            QuantityInput::Percent(pct) => pct,
        };

        let info = self.symbols.lookup(account, symbol).await?;
        let lot_size = info
            .lot_size
            .ok_or_else(|| ClientError::NoLotSizeFilter(symbol.to_string()))?;
        let precision = info.base_asset_precision;

        let balances = account.list_balances().await?;
        let funding_asset = match side {
            Side::Sell => &info.base_asset,
            Side::Buy => &info.quote_asset,
        };
        let balance = balances
            .get(funding_asset)
            .ok_or_else(|| ClientError::BalanceNotFound(funding_asset.clone()))?;
        let reserved = self.locked.locked(account.name(), funding_asset);
        let available = balance.free.checked_sub(reserved).ok_or_else(|| {
            ClientError::InvalidQuantity(format!(
                "cannot deduct {reserved} from {} {funding_asset}",
                balance.free
            ))
        })?;
        let share = available.checked_mul(pct).ok_or_else(|| {
            ClientError::InvalidQuantity(format!("{quantity} of {available} {funding_asset}"))
        })?;

        let amount = match side {
            Side::Sell => share,
            Side::Buy => {
                if price <= Decimal::ZERO {
                    return Err(ClientError::InvalidQuantity(format!(
                        "price must be positive to size a buy order, got {price}"
                    )));
                }
                let base = share.checked_div(price).ok_or_else(|| {
                    ClientError::InvalidQuantity(format!("cannot convert {share} at price {price}"))
                })?;
                round_half_up(base, precision)
            }
        };

        let sized = normalize_with_filter(amount, &lot_size, precision)?;
        debug!(
            account = %account.name(),
            symbol,
            %side,
            %amount,
            %sized,
            "sized order"
        );
        Ok(sized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::traits::MockExchangeApi;
    use crate::common::types::{Balance, LotSize, SymbolInfo};
    use crate::sizing::symbols::SymbolTable;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn symbol(name: &str, lot_size: Option<LotSize>) -> SymbolInfo {
        SymbolInfo {
            symbol: name.to_string(),
            status: "TRADING".to_string(),
            base_asset: "BNB".to_string(),
            base_asset_precision: 8,
            quote_asset: "BTC".to_string(),
            quote_precision: 8,
            lot_size,
        }
    }

    fn symbols() -> SymbolTable {
        let lot = LotSize {
            min_qty: dec!(0.01),
            max_qty: dec!(100000),
            step_size: dec!(0.01),
        };
        let coarse = SymbolInfo {
            base_asset_precision: 2,
            ..symbol("BNBUSD", Some(lot))
        };
        BTreeMap::from([
            ("BNBBTC".to_string(), symbol("BNBBTC", Some(lot))),
            ("BNBETH".to_string(), symbol("BNBETH", None)),
            ("BNBUSD".to_string(), coarse),
        ])
    }

    fn account(balances: Vec<Balance>) -> Account {
        let mut exchange = MockExchangeApi::new();
        exchange
            .expect_get_balances()
            .returning(move || Ok(balances.clone()));
        exchange.expect_get_symbols().times(0..=1).returning(|| Ok(symbols()));
        Account::new("main", Arc::new(exchange))
    }

    fn sizer(locked: LockedBalances) -> OrderSizer {
        OrderSizer::new(Arc::new(SymbolCache::new()), Arc::new(locked))
    }

    #[test]
    fn test_quantity_spec_parsing() {
        assert_eq!(
            "50%".parse::<QuantityInput>().unwrap(),
            QuantityInput::Percent(dec!(0.5))
        );
        assert_eq!(
            "20.120".parse::<QuantityInput>().unwrap(),
            QuantityInput::Absolute(dec!(20.120))
        );
        assert!("lots%".parse::<QuantityInput>().is_err());
    }

    #[tokio::test]
    async fn test_sell_half_of_base_balance() {
        let account = account(vec![Balance::new("BNB", dec!(10), dec!(0))]);
        let qty = sizer(LockedBalances::new())
            .size_order(&account, "BNBBTC", Side::Sell, "50%", dec!(0.01))
            .await
            .unwrap();
        assert_eq!(qty, dec!(5));
    }

    #[tokio::test]
    async fn test_sell_deducts_declared_locked_amount() {
        let account = account(vec![Balance::new("BNB", dec!(10), dec!(0))]);
        let mut locked = LockedBalances::new();
        locked.insert("main", "BNB", dec!(4));

        let qty = sizer(locked)
            .size_order(&account, "BNBBTC", Side::Sell, "50%", dec!(0.01))
            .await
            .unwrap();
        assert_eq!(qty, dec!(3));
    }

    #[tokio::test]
    async fn test_buy_converts_quote_at_price() {
        // 30% of 1 BTC at 0.0025 BTC per BNB = 120 BNB
        let account = account(vec![Balance::new("BTC", dec!(1), dec!(0))]);
        let qty = sizer(LockedBalances::new())
            .size_order(&account, "BNBBTC", Side::Buy, "30%", dec!(0.0025))
            .await
            .unwrap();
        assert_eq!(qty, dec!(120));
    }

    #[tokio::test]
    async fn test_buy_snaps_to_step() {
        // 1 BTC / 0.003 = 333.333... BNB, snapped down to 333.33
        let account = account(vec![Balance::new("BTC", dec!(1), dec!(0))]);
        let qty = sizer(LockedBalances::new())
            .size_order(&account, "BNBBTC", Side::Buy, "100%", dec!(0.003))
            .await
            .unwrap();
        assert_eq!(qty, dec!(333.33));
    }

    #[tokio::test]
    async fn test_buy_rounds_half_up_at_base_precision() {
        // 1.005 BTC / 1 = 1.005 BNB, rounded to 2 places gives 1.01, not 1.00
        let account = account(vec![Balance::new("BTC", dec!(1.005), dec!(0))]);
        let qty = sizer(LockedBalances::new())
            .size_order(&account, "BNBUSD", Side::Buy, "100%", dec!(1))
            .await
            .unwrap();
        assert_eq!(qty, dec!(1.01));
    }

    #[tokio::test]
    async fn test_huge_percentage_is_error() {
        let account = account(vec![Balance::new("BNB", dec!(10000000), dec!(0))]);
        let result = sizer(LockedBalances::new())
            .size_order(
                &account,
                "BNBBTC",
                Side::Sell,
                "10000000000000000000000000%",
                dec!(1),
            )
            .await;
        assert!(matches!(result, Err(ClientError::InvalidQuantity(_))));
    }

    #[tokio::test]
    async fn test_buy_rejects_zero_price() {
        let account = account(vec![Balance::new("BTC", dec!(1), dec!(0))]);
        let result = sizer(LockedBalances::new())
            .size_order(&account, "BNBBTC", Side::Buy, "10%", dec!(0))
            .await;
        assert!(matches!(result, Err(ClientError::InvalidQuantity(_))));
    }

    #[tokio::test]
    async fn test_absolute_quantity_passes_through() {
        let mut exchange = MockExchangeApi::new();
        exchange.expect_get_balances().never();
        exchange.expect_get_symbols().never();
        let account = Account::new("main", Arc::new(exchange));

        let qty = sizer(LockedBalances::new())
            .size_order(&account, "BNBBTC", Side::Sell, "20.120", dec!(0.01))
            .await
            .unwrap();
        assert_eq!(qty.to_string(), "20.120");
    }

    #[tokio::test]
    async fn test_sizing_errors() {
        let account = account(vec![Balance::new("BTC", dec!(1), dec!(0))]);
        let sizer = sizer(LockedBalances::new());

        let result = sizer
            .size_order(&account, "XRPBTC", Side::Sell, "10%", dec!(1))
            .await;
        assert!(matches!(result, Err(ClientError::SymbolNotFound(_))));

        let result = sizer
            .size_order(&account, "BNBETH", Side::Sell, "10%", dec!(1))
            .await;
        assert!(matches!(result, Err(ClientError::NoLotSizeFilter(_))));

        let result = sizer
            .size_order(&account, "BNBBTC", Side::Sell, "10%", dec!(1))
            .await;
        assert!(matches!(result, Err(ClientError::BalanceNotFound(asset)) if asset == "BNB"));

        let result = sizer
            .size_order(&account, "BNBBTC", Side::Sell, "ten%", dec!(1))
            .await;
        assert!(matches!(result, Err(ClientError::InvalidQuantity(_))));
    }

    #[tokio::test]
    async fn test_symbols_loaded_once_across_orders() {
        let mut exchange = MockExchangeApi::new();
        exchange
            .expect_get_balances()
            .times(2)
            .returning(|| Ok(vec![Balance::new("BNB", dec!(2), dec!(0))]));
        exchange.expect_get_symbols().times(1).returning(|| Ok(symbols()));
        let account = Account::new("main", Arc::new(exchange));
        let sizer = sizer(LockedBalances::new());

        for _ in 0..2 {
            let qty = sizer
                .size_order(&account, "BNBBTC", Side::Sell, "25%", dec!(1))
                .await
                .unwrap();
            assert_eq!(qty, dec!(0.5));
        }
    }
}
