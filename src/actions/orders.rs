use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use super::ActionContext;
use crate::account::{Account, AccountSelector};
use crate::aggregate::AccountPayload;
use crate::common::errors::{ClientError, Result};
use crate::common::types::{OrderRequest, Side};
use crate::dispatch::AccountResults;
use crate::sizing::OrderSizer;

/// Arguments of list-order
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub symbol: Option<String>,
    /// Full order history instead of open orders; needs a symbol
    pub all: bool,
    pub limit: Option<u32>,
}

/// Arguments of list-trade
#[derive(Debug, Clone)]
pub struct TradeQuery {
    pub symbol: String,
    pub limit: Option<u32>,
}

/// Arguments of cancel-order
#[derive(Debug, Clone)]
pub struct CancelRequest {
    pub symbol: String,
    /// Cancel only this order; every open order of the symbol when `None`
    pub order_id: Option<i64>,
}

/// Arguments of create-order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub symbol: String,
    pub side: Side,
    /// Absolute quantity (`20.120`) or share of the balance (`50%`)
    pub quantity: String,
    pub price: Decimal,
    /// Validate only, do not place the order
    pub test: bool,
}

async fn account_orders(account: Arc<Account>, query: OrderQuery) -> Result<AccountPayload> {
    let orders = match (query.all, query.symbol.as_deref()) {
        (true, Some(symbol)) => account.list_all_orders(symbol, query.limit).await?,
        (true, None) => {
            return Err(ClientError::InvalidArgument(
                "symbol is required to list all orders".to_string(),
            ))
        }
        (false, symbol) => account.list_open_orders(symbol).await?,
    };
    Ok(AccountPayload::Orders(orders))
}

async fn account_trades(account: Arc<Account>, query: TradeQuery) -> Result<AccountPayload> {
    let trades = account.list_trades(&query.symbol, query.limit).await?;
    Ok(AccountPayload::Trades(trades))
}

async fn account_cancel(account: Arc<Account>, request: CancelRequest) -> Result<AccountPayload> {
    let order_ids = match request.order_id {
        Some(order_id) => vec![order_id],
        None => account
            .list_open_orders(Some(&request.symbol))
            .await?
            .into_iter()
            .map(|order| order.order_id)
            .collect(),
    };

    let mut canceled = Vec::with_capacity(order_ids.len());
    for order_id in order_ids {
        account.cancel_order(&request.symbol, order_id).await?;
        canceled.push(order_id);
    }
    Ok(AccountPayload::Canceled(canceled))
}

async fn account_create_order(
    account: Arc<Account>,
    sizer: OrderSizer,
    order: NewOrder,
) -> Result<AccountPayload> {
    let quantity = sizer
        .size_order(&account, &order.symbol, order.side, &order.quantity, order.price)
        .await?;
    if quantity.is_zero() {
        return Err(ClientError::InvalidQuantity(format!(
            "{} of {} is below the minimum lot size",
            order.quantity, order.symbol
        )));
    }

    let request = OrderRequest {
        symbol: order.symbol,
        side: order.side,
        quantity,
        price: order.price,
    };

    if order.test {
        account.test_create_order(request).await?;
        return Ok(AccountPayload::OrderTested("ok".to_string()));
    }

    let order_id = account.create_order(request).await?;
    info!(account = %account.name(), order_id, "Order placed");
    Ok(AccountPayload::OrderPlaced(order_id))
}

impl ActionContext {
    /// Open orders, or the order history of a symbol
    pub async fn list_orders(
        &self,
        selector: &AccountSelector,
        query: OrderQuery,
    ) -> Result<AccountResults<AccountPayload>> {
        if query.all && query.symbol.is_none() {
            return Err(ClientError::InvalidArgument(
                "symbol is required to list all orders".to_string(),
            ));
        }
        self.dispatcher
            .dispatch(selector, move |account| account_orders(account, query.clone()))
            .await
    }

    /// Trade history of a symbol
    pub async fn list_trades(
        &self,
        selector: &AccountSelector,
        query: TradeQuery,
    ) -> Result<AccountResults<AccountPayload>> {
        self.dispatcher
            .dispatch(selector, move |account| account_trades(account, query.clone()))
            .await
    }

    /// Cancel one order, or every open order of the symbol
    pub async fn cancel_orders(
        &self,
        selector: &AccountSelector,
        request: CancelRequest,
    ) -> Result<AccountResults<AccountPayload>> {
        self.dispatcher
            .dispatch(selector, move |account| {
                account_cancel(account, request.clone())
            })
            .await
    }

    /// Size and place a limit order on every selected account
    pub async fn create_order(
        &self,
        selector: &AccountSelector,
        order: NewOrder,
    ) -> Result<AccountResults<AccountPayload>> {
        let sizer = self.sizer();
        self.dispatcher
            .dispatch(selector, move |account| {
                account_create_order(account, sizer.clone(), order.clone())
            })
            .await
    }
}
