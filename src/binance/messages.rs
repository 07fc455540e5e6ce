//! Raw Binance REST API response shapes

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::common::types::{Balance, LotSize, SymbolInfo};

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub code: i64,
    pub msg: String,
}

/// Response of `GET /api/v3/account`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub balances: Vec<Balance>,
}

/// Response of `GET /api/v3/exchangeInfo`
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfoResponse {
    pub symbols: Vec<RawSymbol>,
}

/// Symbol entry of the exchange info
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSymbol {
    pub symbol: String,
    pub status: String,
    pub base_asset: String,
    pub base_asset_precision: u32,
    pub quote_asset: String,
    #[serde(default)]
    pub quote_precision: u32,
    #[serde(default)]
    pub filters: Vec<SymbolFilter>,
}

/// Symbol filters; only the lot size is interpreted
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "filterType")]
pub enum SymbolFilter {
    #[serde(rename = "LOT_SIZE", rename_all = "camelCase")]
    LotSize {
        min_qty: Decimal,
        max_qty: Decimal,
        step_size: Decimal,
    },
    #[serde(other)]
    Other,
}

impl From<RawSymbol> for SymbolInfo {
    fn from(raw: RawSymbol) -> Self {
        let lot_size = raw.filters.iter().find_map(|filter| match filter {
            SymbolFilter::LotSize {
                min_qty,
                max_qty,
                step_size,
            } => Some(LotSize {
                min_qty: *min_qty,
                max_qty: *max_qty,
                step_size: *step_size,
            }),
            SymbolFilter::Other => None,
        });

        SymbolInfo {
            symbol: raw.symbol,
            status: raw.status,
            base_asset: raw.base_asset,
            base_asset_precision: raw.base_asset_precision,
            quote_asset: raw.quote_asset,
            quote_precision: raw.quote_precision,
            lot_size,
        }
    }
}

/// Response of `POST /api/v3/order`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: i64,
}
