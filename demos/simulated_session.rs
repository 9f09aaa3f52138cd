// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use bigdecimal::BigDecimal;
use futures_console::api::Client;
use futures_console::api::common::{OrderSide, OrderStatus};
use futures_console::api::request::OrderRequest;
use futures_console::batch::{self, BatchPlan};
use futures_console::simulated::{SimulatedClient, SimulatedExchangeBuilder};
use std::io;
use std::str::FromStr;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A wallet of 10000 USDT trading at 10x leverage
    let exchange = SimulatedExchangeBuilder::new("USDT")
        .set_balance("USDT", BigDecimal::from(10_000))
        .set_mark_price("BTCUSDT", BigDecimal::from(60_000))
        .set_leverage(10)?
        .build()?;
    let mut client = SimulatedClient::new(exchange);

    // Market orders fill at the mark price straight away
    let order = client
        .place_order(OrderRequest::create_market(
            "BTCUSDT",
            OrderSide::Buy,
            BigDecimal::from_str("0.05")?,
        ))
        .await?;
    assert_eq!(order.status, OrderStatus::Filled);

    // A stop-loss below the market rests until the price falls to it
    let stop_loss = OrderRequest::create_stop_limit(
        "BTCUSDT",
        OrderSide::Sell,
        BigDecimal::from_str("0.05")?,
        BigDecimal::from(58_000),
        BigDecimal::from(58_100),
    );
    stop_loss.validate(Some(&BigDecimal::from(60_000)))?;
    client.place_order(stop_loss).await?;

    client.set_mark_price("BTCUSDT", BigDecimal::from(61_000))?;

    // Same output the command-line mode prints
    let plan = BatchPlan {
        show_price: true,
        show_orders: true,
        show_positions: true,
        ..BatchPlan::new("BTCUSDT")
    };
    let (client, failed) = batch::run(client, &plan, io::stdout()).await?;
    assert_eq!(failed, 0);

    let wallet = client.exchange().get_wallet_balance("USDT");
    println!(
        "USDT wallet balance: {} at {}x leverage",
        wallet.to_plain_string(),
        client.exchange().leverage()
    );

    Ok(())
}
