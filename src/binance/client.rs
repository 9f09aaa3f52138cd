// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::ApiError;
use crate::api::common::{Balance, Order, OrderType, Position, TickerPrice};
use crate::api::request::OrderRequest;
use crate::api::{Client, Market};
use crate::binance::converters::to_wire_order_type;
use crate::binance::model::{
    BalanceResponse, ErrorResponse, OrderResponse, PositionResponse, TickerPriceResponse,
};
use crate::config::ExchangeConfig;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

const API_KEY_HEADER: &str = "x-mbx-apikey";

/// Client for the Binance USDT-M Futures REST API.
pub struct BinanceClient {
    http_client: reqwest::Client,
    config: ExchangeConfig,
}

impl BinanceClient {
    pub fn new(config: ExchangeConfig) -> Result<Self> {
        let mut header_map = HeaderMap::new();
        header_map.insert("accept", HeaderValue::from_str("application/json")?);
        header_map.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(config.credentials.api_key())
                .context("API key is not a valid header value")?,
        );
        let http_client = reqwest::ClientBuilder::new()
            .default_headers(header_map)
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    /// Creates a client and checks both connectivity and credentials, so that a bad key fails
    /// here rather than at the first menu action.
    pub async fn connect(config: ExchangeConfig) -> Result<Self> {
        let client = Self::new(config)?;
        info!(base_url = %client.config.base_url, "Connecting to futures API");
        client
            .ping()
            .await
            .with_context(|| format!("Connection to {} failed", client.config.base_url))?;
        client
            .get_balances()
            .await
            .context("Credentials were rejected")?;
        info!("Connected to futures API successfully");
        Ok(client)
    }

    fn url(&self, path: &str) -> Result<Url> {
        let base_url = self.config.base_url.trim_end_matches('/');
        Url::parse(&format!("{base_url}{path}")).with_context(|| format!("Invalid URL {base_url}{path}"))
    }

    fn public_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = self.url(path)?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    fn signed_url(&self, path: &str, params: &[(&str, String)], timestamp: i64) -> Result<Url> {
        let mut url = self.url(path)?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("recvWindow", &self.config.recv_window.to_string())
            .append_pair("timestamp", &timestamp.to_string());
        let payload = url.query().unwrap_or_default().to_string();
        let signature = sign(self.config.credentials.api_secret(), &payload)?;
        url.query_pairs_mut().append_pair("signature", &signature);
        Ok(url)
    }

    async fn execute_request<T>(&self, method: Method, url: Url) -> Result<T>
    where
        T: DeserializeOwned,
    {
        debug!(%method, path = url.path(), "sending request");
        let response = self.http_client.request(method, url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(rejection(status, &body))
    }

    async fn public<T>(&self, method: Method, path: &str, params: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.public_url(path, params)?;
        self.execute_request(method, url).await
    }

    async fn signed<T>(&self, method: Method, path: &str, params: &[(&str, String)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.signed_url(path, params, Utc::now().timestamp_millis())?;
        self.execute_request(method, url).await
    }
}

/// Maps an unsuccessful response to an [ApiError] when the body carries one.
fn rejection(status: StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(error) => {
            warn!(code = error.code, msg = %error.msg, "request rejected");
            ApiError::from(error).into()
        }
        Err(_) => anyhow!("HTTP {}: {}", status, body),
    }
}

/// Hex-encoded HMAC-SHA256 of `payload` keyed with the API secret.
pub fn sign(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|err| anyhow!("Failed to create HMAC: {}", err))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn order_params(req: &OrderRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("symbol", req.symbol.clone()),
        ("side", req.side.to_string()),
        ("type", to_wire_order_type(&req.type_).to_string()),
        ("quantity", req.quantity.to_plain_string()),
    ];
    if matches!(req.type_, OrderType::Limit | OrderType::StopLimit) {
        params.push(("timeInForce", "GTC".to_string()));
    }
    if let Some(price) = &req.price {
        params.push(("price", price.to_plain_string()));
    }
    if let Some(stop_price) = &req.stop_price {
        params.push(("stopPrice", stop_price.to_plain_string()));
    }
    params.push(("newClientOrderId", req.client_order_id.clone()));
    params
}

fn symbol_params(symbol: Option<&str>) -> Vec<(&'static str, String)> {
    symbol
        .map(|symbol| vec![("symbol", symbol.to_string())])
        .unwrap_or_default()
}

#[async_trait]
impl Client for BinanceClient {
    async fn ping(&self) -> Result<()> {
        let _: serde_json::Value = self.public(Method::GET, "/fapi/v1/ping", &[]).await?;
        Ok(())
    }

    async fn get_balances(&self) -> Result<Vec<Balance>> {
        let balances: Vec<BalanceResponse> =
            self.signed(Method::GET, "/fapi/v2/balance", &[]).await?;
        balances.into_iter().map(Balance::try_from).collect()
    }

    async fn place_order(&mut self, req: OrderRequest) -> Result<Order> {
        info!(
            symbol = %req.symbol,
            side = %req.side,
            type_ = %req.type_,
            quantity = %req.quantity,
            client_order_id = %req.client_order_id,
            "Placing order"
        );
        let order: OrderResponse = self
            .signed(Method::POST, "/fapi/v1/order", &order_params(&req))
            .await?;
        let order = Order::try_from(order)?;
        info!(order_id = order.order_id, status = %order.status, "Order placed");
        Ok(order)
    }

    async fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>> {
        let orders: Vec<OrderResponse> = self
            .signed(Method::GET, "/fapi/v1/openOrders", &symbol_params(symbol))
            .await?;
        orders.into_iter().map(Order::try_from).collect()
    }

    async fn get_positions(&self, symbol: Option<&str>) -> Result<Vec<Position>> {
        let positions: Vec<PositionResponse> = self
            .signed(Method::GET, "/fapi/v2/positionRisk", &symbol_params(symbol))
            .await?;
        positions.into_iter().map(Position::try_from).collect()
    }

    async fn cancel_order(&mut self, symbol: &str, order_id: u64) -> Result<Order> {
        let params = [
            ("symbol", symbol.to_string()),
            ("orderId", order_id.to_string()),
        ];
        let order: OrderResponse = self
            .signed(Method::DELETE, "/fapi/v1/order", &params)
            .await?;
        Order::try_from(order)
    }

    async fn cancel_all_orders(&mut self, symbol: &str) -> Result<()> {
        let _: serde_json::Value = self
            .signed(
                Method::DELETE,
                "/fapi/v1/allOpenOrders",
                &symbol_params(Some(symbol)),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Market for BinanceClient {
    async fn get_price(&self, symbol: &str) -> Result<TickerPrice> {
        let ticker: TickerPriceResponse = self
            .public(
                Method::GET,
                "/fapi/v1/ticker/price",
                &symbol_params(Some(symbol)),
            )
            .await?;
        TickerPrice::try_from(ticker)
    }
}
