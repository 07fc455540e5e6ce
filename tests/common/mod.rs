//! Common test utilities and fixtures
#![allow(dead_code)]

use binance_accounts::{Account, BinanceRestClient};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SECRET: &str = "test-secret";

/// Account backed by a REST client pointed at the mock server
pub fn mock_account(server: &MockServer, name: &str, api_key: &str) -> Account {
    let client = BinanceRestClient::new(&server.uri(), api_key, SECRET)
        .expect("Failed to create REST client");
    Account::new(name, Arc::new(client))
}

/// Answer `GET /api/v3/account` for one API key
pub async fn mount_account(server: &MockServer, api_key: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .and(header("X-MBX-APIKEY", api_key))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Reject every signed request made with this API key
pub async fn mount_rejected_key(server: &MockServer, api_key: &str) {
    Mock::given(header("X-MBX-APIKEY", api_key))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": -2015,
            "msg": "Invalid API-key, IP, or permissions for action."
        })))
        .mount(server)
        .await;
}

/// Account body in the shape `GET /api/v3/account` returns
pub fn account_body(balances: &[(&str, &str, &str)]) -> Value {
    let balances: Vec<Value> = balances
        .iter()
        .map(|(asset, free, locked)| json!({"asset": asset, "free": free, "locked": locked}))
        .collect();
    json!({
        "makerCommission": 10,
        "takerCommission": 10,
        "canTrade": true,
        "canWithdraw": true,
        "canDeposit": true,
        "updateTime": 1704067200000i64,
        "accountType": "SPOT",
        "balances": balances,
        "permissions": ["SPOT"]
    })
}

/// Exchange info with a single BNBBTC symbol
static EXCHANGE_INFO: Lazy<Value> = Lazy::new(|| {
    json!({
        "timezone": "UTC",
        "serverTime": 1704067200000i64,
        "symbols": [{
            "symbol": "BNBBTC",
            "status": "TRADING",
            "baseAsset": "BNB",
            "baseAssetPrecision": 8,
            "quoteAsset": "BTC",
            "quotePrecision": 8,
            "quoteAssetPrecision": 8,
            "orderTypes": ["LIMIT", "MARKET"],
            "filters": [
                {"filterType": "PRICE_FILTER", "minPrice": "0.00000100", "maxPrice": "100000.00000000", "tickSize": "0.00000100"},
                {"filterType": "LOT_SIZE", "minQty": "0.01000000", "maxQty": "100000.00000000", "stepSize": "0.01000000"},
                {"filterType": "MAX_NUM_ORDERS", "maxNumOrders": 200}
            ]
        }]
    })
});

pub fn exchange_info() -> Value {
    EXCHANGE_INFO.clone()
}

/// Margin account body in the shape `GET /sapi/v1/margin/account` returns
pub fn margin_body() -> Value {
    json!({
        "borrowEnabled": true,
        "marginLevel": "11.64405625",
        "totalAssetOfBtc": "6.82728457",
        "totalLiabilityOfBtc": "0.58633215",
        "totalNetAssetOfBtc": "6.24095242",
        "tradeEnabled": true,
        "transferEnabled": true,
        "userAssets": [
            {"asset": "BTC", "borrowed": "0.00000000", "free": "0.00499500", "interest": "0.00000000", "locked": "0.00000000", "netAsset": "0.00499500"},
            {"asset": "BNB", "borrowed": "201.66666672", "free": "2346.50000000", "interest": "0.00000000", "locked": "0.00000000", "netAsset": "2144.83333328"}
        ]
    })
}
