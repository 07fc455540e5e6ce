//! REST API client for Binance spot and margin accounts

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::auth::{signed_query, timestamp_ms, API_KEY_HEADER};
use super::messages::*;
use crate::common::errors::{ClientError, Result};
use crate::common::traits::ExchangeApi;
use crate::common::types::{
    Balance, MarginAccount, Order, OrderRequest, SymbolInfo, SymbolPrice, Trade,
};
use crate::config::types::{AccountKey, AppSettings};

/// REST API client bound to one account's key pair
#[derive(Debug, Clone)]
pub struct BinanceRestClient {
    /// HTTP client
    client: Client,
    /// Base URL for the spot API
    base_url: String,
    /// Base URL for the margin (sapi) API
    margin_url: String,
    /// API key sent in the header
    api_key: String,
    /// Secret used to sign queries
    secret_key: String,
    /// recvWindow for signed requests
    recv_window_ms: u64,
}

impl BinanceRestClient {
    /// Create a new REST client
    pub fn new(base_url: &str, api_key: &str, secret_key: &str) -> Result<Self> {
        Self::with_timeout(base_url, api_key, secret_key, Duration::from_secs(30))
    }

    /// Create a new REST client with custom timeout
    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        secret_key: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            margin_url: base_url.clone(),
            base_url,
            api_key: api_key.to_string(),
            secret_key: secret_key.to_string(),
            recv_window_ms: 5000,
        })
    }

    /// Create a client for one key file entry using the app settings
    pub fn from_settings(key: &AccountKey, settings: &AppSettings) -> Result<Self> {
        let client = Self::with_timeout(
            &settings.rest_url,
            &key.api_key,
            &key.secret_key,
            Duration::from_secs(settings.request_timeout_seconds),
        )?;
        Ok(client
            .with_margin_url(&settings.margin_url)
            .with_recv_window(settings.recv_window_ms))
    }

    /// Use a different base URL for margin endpoints
    pub fn with_margin_url(mut self, margin_url: &str) -> Self {
        self.margin_url = margin_url.trim_end_matches('/').to_string();
        self
    }

    /// Set the recvWindow sent with signed requests
    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window_ms = recv_window_ms;
        self
    }

    // ========================================================================
    // Request Helpers
    // ========================================================================

    /// Send an unsigned GET request
    async fn public_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).query(params).send().await?;
        Self::parse_response(response).await
    }

    /// Send a signed request against the given base URL
    async fn signed<T: DeserializeOwned>(
        &self,
        method: Method,
        base_url: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let query = signed_query(&self.secret_key, params, self.recv_window_ms, timestamp_ms())?;
        let url = format!("{}{}?{}", base_url, path, query);
        debug!("{} {}{}", method, base_url, path);

        let response = self
            .client
            .request(method, &url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Map non-2xx statuses to API errors and decode the body
    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                return Err(ClientError::Api {
                    code: api_error.code,
                    msg: api_error.msg,
                });
            }
            return Err(ClientError::InvalidResponse(format!(
                "Server returned status {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn order_params(request: &OrderRequest) -> Vec<(&'static str, String)> {
        vec![
            ("symbol", request.symbol.clone()),
            ("side", request.side.to_string()),
            ("type", "LIMIT".to_string()),
            ("timeInForce", "GTC".to_string()),
            ("quantity", request.quantity.to_string()),
            ("price", request.price.to_string()),
        ]
    }
}

#[async_trait]
impl ExchangeApi for BinanceRestClient {
    #[instrument(skip(self))]
    async fn get_balances(&self) -> Result<Vec<Balance>> {
        let account: AccountResponse = self
            .signed(Method::GET, &self.base_url, "/api/v3/account", &[])
            .await?;
        Ok(account.balances)
    }

    #[instrument(skip(self))]
    async fn get_symbols(&self) -> Result<BTreeMap<String, SymbolInfo>> {
        let info: ExchangeInfoResponse = self.public_get("/api/v3/exchangeInfo", &[]).await?;
        Ok(info
            .symbols
            .into_iter()
            .map(|raw| (raw.symbol.clone(), SymbolInfo::from(raw)))
            .collect())
    }

    #[instrument(skip(self))]
    async fn list_prices(&self, symbol: Option<String>) -> Result<Vec<SymbolPrice>> {
        match symbol {
            // A single-symbol query returns an object rather than a list
            Some(symbol) => {
                let price: SymbolPrice = self
                    .public_get("/api/v3/ticker/price", &[("symbol", symbol)])
                    .await?;
                Ok(vec![price])
            }
            None => self.public_get("/api/v3/ticker/price", &[]).await,
        }
    }

    #[instrument(skip(self))]
    async fn list_open_orders(&self, symbol: Option<String>) -> Result<Vec<Order>> {
        let params: Vec<(&str, String)> = symbol.into_iter().map(|s| ("symbol", s)).collect();
        self.signed(Method::GET, &self.base_url, "/api/v3/openOrders", &params)
            .await
    }

    #[instrument(skip(self))]
    async fn list_all_orders(&self, symbol: String, limit: Option<u32>) -> Result<Vec<Order>> {
        let mut params = vec![("symbol", symbol)];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        self.signed(Method::GET, &self.base_url, "/api/v3/allOrders", &params)
            .await
    }

    #[instrument(skip(self))]
    async fn list_trades(&self, symbol: String, limit: Option<u32>) -> Result<Vec<Trade>> {
        let mut params = vec![("symbol", symbol)];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        self.signed(Method::GET, &self.base_url, "/api/v3/myTrades", &params)
            .await
    }

    #[instrument(skip(self))]
    async fn cancel_order(&self, symbol: String, order_id: i64) -> Result<()> {
        let params = [("symbol", symbol), ("orderId", order_id.to_string())];
        let _: serde_json::Value = self
            .signed(Method::DELETE, &self.base_url, "/api/v3/order", &params)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_order(&self, request: OrderRequest) -> Result<i64> {
        let params = Self::order_params(&request);
        let response: CreateOrderResponse = self
            .signed(Method::POST, &self.base_url, "/api/v3/order", &params)
            .await?;
        Ok(response.order_id)
    }

    #[instrument(skip(self))]
    async fn test_create_order(&self, request: OrderRequest) -> Result<()> {
        let params = Self::order_params(&request);
        let _: serde_json::Value = self
            .signed(Method::POST, &self.base_url, "/api/v3/order/test", &params)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_margin_account(&self) -> Result<MarginAccount> {
        self.signed(Method::GET, &self.margin_url, "/sapi/v1/margin/account", &[])
            .await
    }
}
