use serde::Serialize;

use crate::common::types::{Balance, MarginAccount, Order, SymbolInfo, SymbolPrice, Trade};
use crate::sizing::SymbolTable;

/// Everything an account action can produce
///
/// Reducers match on the variant they total and skip the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AccountPayload {
    Balances(AccountBalances),
    Margin(MarginView),
    Orders(Vec<Order>),
    Prices(Vec<SymbolPrice>),
    Canceled(Vec<i64>),
    OrderPlaced(i64),
    OrderTested(String),
    Symbols(SymbolTable),
    Symbol(SymbolInfo),
    Trades(Vec<Trade>),
}

/// Selected spot balances of one account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalances {
    pub name: String,
    pub balances: Vec<Balance>,
}

/// Margin account of one account, user assets already filtered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginView {
    #[serde(rename = "Name")]
    pub name: String,
    pub margin: MarginAccount,
}
