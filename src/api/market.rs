// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::TickerPrice;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Market {
    /// Returns the latest traded price for the given symbol, e.g. `BTCUSDT`.
    async fn get_price(&self, symbol: &str) -> Result<TickerPrice>;
}
