// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::{Balance, Order, Position, TickerPrice};
use crate::api::request::OrderRequest;
use crate::api::{Client, Market};
use crate::simulated::exchange::SimulatedExchange;
use anyhow::Result;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use tracing::info;

pub struct SimulatedClient {
    exchange: SimulatedExchange,
}

impl SimulatedClient {
    pub fn new(exchange: SimulatedExchange) -> Self {
        Self { exchange }
    }

    pub fn set_mark_price(&mut self, symbol: &str, price: BigDecimal) -> Result<()> {
        self.exchange.set_mark_price(symbol, price)
    }

    pub fn exchange(&self) -> &SimulatedExchange {
        &self.exchange
    }
}

#[async_trait]
impl Client for SimulatedClient {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get_balances(&self) -> Result<Vec<Balance>> {
        Ok(self.exchange.get_balances())
    }

    async fn place_order(&mut self, req: OrderRequest) -> Result<Order> {
        self.exchange.place_order(req)
    }

    async fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>> {
        Ok(self.exchange.get_open_orders(symbol))
    }

    async fn get_positions(&self, symbol: Option<&str>) -> Result<Vec<Position>> {
        self.exchange.get_positions(symbol)
    }

    async fn cancel_order(&mut self, symbol: &str, order_id: u64) -> Result<Order> {
        self.exchange.cancel_order(symbol, order_id)
    }

    async fn cancel_all_orders(&mut self, symbol: &str) -> Result<()> {
        let canceled = self.exchange.cancel_all_orders(symbol)?;
        info!(symbol, canceled, "simulated cancel-all");
        Ok(())
    }
}

#[async_trait]
impl Market for SimulatedClient {
    async fn get_price(&self, symbol: &str) -> Result<TickerPrice> {
        Ok(TickerPrice {
            symbol: symbol.into(),
            price: self.exchange.get_mark_price(symbol)?,
            time: Some(Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Environment;
    use crate::api::common::{OrderSide, OrderStatus};
    use crate::simulated::exchange::SimulatedExchangeBuilder;
    use std::str::FromStr;

    const BTC_USDT: &str = "BTCUSDT";

    #[tokio::test]
    async fn place_market_order_returns_filled_order() -> Result<()> {
        let mut client = create_client()?;

        let order = client
            .place_order(OrderRequest::create_market(
                BTC_USDT,
                OrderSide::Buy,
                BigDecimal::from_str("0.5")?,
            ))
            .await?;

        assert_ne!(order.order_id, 0);
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.symbol, BTC_USDT);

        Ok(())
    }

    #[tokio::test]
    async fn get_price_returns_mark_price() -> Result<()> {
        let mut client = create_client()?;
        assert_eq!(client.get_price(BTC_USDT).await?.price, BigDecimal::from(50000));

        client.set_mark_price(BTC_USDT, BigDecimal::from(51000))?;
        assert_eq!(client.get_price(BTC_USDT).await?.price, BigDecimal::from(51000));

        Ok(())
    }

    #[tokio::test]
    async fn get_price_unknown_symbol() -> Result<()> {
        let client = create_client()?;
        let err = client.get_price("DOGEUSDT").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid symbol. (code -1121)");
        Ok(())
    }

    #[tokio::test]
    async fn open_orders_and_cancel_all() -> Result<()> {
        let mut client = create_client()?;
        assert!(client.get_open_orders(None).await?.is_empty());

        for price in [49000, 48000] {
            client
                .place_order(OrderRequest::create_limit(
                    BTC_USDT,
                    OrderSide::Buy,
                    BigDecimal::from_str("0.01")?,
                    BigDecimal::from(price),
                ))
                .await?;
        }
        assert_eq!(client.get_open_orders(Some(BTC_USDT)).await?.len(), 2);

        client.cancel_all_orders(BTC_USDT).await?;
        assert!(client.get_open_orders(Some(BTC_USDT)).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn balances_reflect_positions() -> Result<()> {
        let mut client = create_client()?;
        client
            .place_order(OrderRequest::create_market(
                BTC_USDT,
                OrderSide::Sell,
                BigDecimal::from_str("0.1")?,
            ))
            .await?;

        let positions = client.get_positions(Some(BTC_USDT)).await?;
        assert_eq!(positions[0].amount, BigDecimal::from_str("-0.1")?);

        let balances = client.get_balances().await?;
        assert_eq!(balances[0].balance, BigDecimal::from(10000));
        // 0.1 * 50000 / 20
        assert_eq!(balances[0].available_balance, BigDecimal::from(9750));

        Ok(())
    }

    #[tokio::test]
    async fn usable_as_environment() -> Result<()> {
        async fn ping_env(env: &impl Environment) -> Result<()> {
            env.ping().await
        }
        ping_env(&create_client()?).await
    }

    fn create_client() -> Result<SimulatedClient> {
        let exchange = SimulatedExchangeBuilder::new("USDT")
            .set_balance("USDT", BigDecimal::from(10000))
            .set_mark_price(BTC_USDT, BigDecimal::from(50000))
            .build()?;
        Ok(SimulatedClient::new(exchange))
    }
}
