// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::{Balance, Order, Position};
use crate::api::request::OrderRequest;
use anyhow::Result;
use async_trait::async_trait;

/// A trait for instances of a trading client, which allows operations with the underlying exchange.
#[async_trait]
pub trait Client {
    /// Checks that the exchange is reachable.
    async fn ping(&self) -> Result<()>;

    /// Returns the wallet balance of every margin asset in the account.
    async fn get_balances(&self) -> Result<Vec<Balance>>;

    /// Places an order and returns the order as acknowledged by the exchange.
    async fn place_order(&mut self, req: OrderRequest) -> Result<Order>;

    /// Returns the orders that are still working, optionally only those for `symbol`.
    async fn get_open_orders(&self, symbol: Option<&str>) -> Result<Vec<Order>>;

    /// Returns position records, optionally only the one for `symbol`.
    async fn get_positions(&self, symbol: Option<&str>) -> Result<Vec<Position>>;

    /// Cancels a single order and returns it in its canceled state.
    async fn cancel_order(&mut self, symbol: &str, order_id: u64) -> Result<Order>;

    /// Cancels every open order for `symbol` with one symbol-scoped request.
    async fn cancel_all_orders(&mut self, symbol: &str) -> Result<()>;
}
