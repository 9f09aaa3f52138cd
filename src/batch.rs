// SPDX-License-Identifier: GPL-3.0-or-later

//! One-shot mode: a fixed sequence of console actions taken from the command line.

use crate::api::Environment;
use crate::api::common::{OrderSide, OrderType};
use crate::api::request::OrderRequest;
use crate::console::{Console, ConsoleOptions};
use anyhow::{Result, format_err};
use bigdecimal::BigDecimal;
use std::io::{self, Write};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchPlan {
    pub symbol: String,
    pub show_price: bool,
    pub side: Option<OrderSide>,
    pub type_: Option<OrderType>,
    pub quantity: Option<BigDecimal>,
    pub price: Option<BigDecimal>,
    pub stop_price: Option<BigDecimal>,
    pub show_orders: bool,
    pub show_positions: bool,
    pub cancel_order: Option<u64>,
    pub cancel_all: bool,
}

impl BatchPlan {
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.trim().to_ascii_uppercase(),
            ..Default::default()
        }
    }

    /// The order to place, if both a side and a type were given.
    pub fn order_request(&self) -> Option<Result<OrderRequest>> {
        let (side, type_) = (self.side?, self.type_.clone()?);
        let Some(quantity) = self.quantity.clone() else {
            return Some(Err(format_err!("--quantity is required to place an order")));
        };
        Some(Ok(OrderRequest::create(
            &self.symbol,
            side,
            type_,
            quantity,
            self.price.clone(),
            self.stop_price.clone(),
        )))
    }
}

/// Runs every action in `plan` against `env`, writing results to `output`.
///
/// A failing action is reported and the remaining ones still run. Returns the number of actions
/// that failed.
pub async fn run<E, W>(env: E, plan: &BatchPlan, output: W) -> Result<(E, usize)>
where
    E: Environment,
    W: Write,
{
    let options = ConsoleOptions {
        pause_after_action: false,
        default_symbol: plan.symbol.clone(),
    };
    let mut console = Console::new(env, io::empty(), output).with_options(options);
    let mut failed = 0;
    let mut tally = |console: &mut Console<E, io::Empty, W>, result: Result<()>| -> Result<()> {
        if let Err(err) = result {
            failed += 1;
            console.report(&err)?;
        }
        Ok(())
    };

    let result = console.show_balance().await;
    tally(&mut console, result)?;
    if plan.show_price {
        let result = console.show_price(&plan.symbol).await;
        tally(&mut console, result)?;
    }
    if let Some(req) = plan.order_request() {
        let result = match req {
            Ok(req) => console.submit_order(req).await,
            Err(err) => Err(err),
        };
        tally(&mut console, result)?;
    }
    if plan.show_orders {
        let result = console.show_open_orders(Some(&plan.symbol)).await;
        tally(&mut console, result)?;
    }
    if plan.show_positions {
        let result = console.show_positions(Some(&plan.symbol)).await;
        tally(&mut console, result)?;
    }
    if let Some(order_id) = plan.cancel_order {
        let result = console.cancel_order(&plan.symbol, order_id).await;
        tally(&mut console, result)?;
    }
    if plan.cancel_all {
        let result = console.cancel_all_orders(&plan.symbol).await;
        tally(&mut console, result)?;
    }

    let (env, _) = console.into_parts();
    Ok((env, failed))
}
