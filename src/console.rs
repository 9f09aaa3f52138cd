// Copyright (C) 2025 Agostinho Junior
// SPDX-License-Identifier: GPL-3.0-or-later

//! The interactive order console: a menu-driven loop over an [Environment].
//!
//! Every action runs to completion before the next prompt. Errors from the exchange are caught
//! per action, logged and printed, and the loop carries on; only a closed input or a failing
//! output stream ends [Console::run].

pub use menu::MenuChoice;
mod menu;

pub use prompt::{InputClosed, Prompter};
mod prompt;

pub mod render;

use crate::api::Environment;
use crate::api::common::OrderSide;
use crate::api::request::OrderRequest;
use anyhow::{Context, Result, anyhow};
use bigdecimal::BigDecimal;
use std::io::{BufRead, Write};
use std::str::FromStr;
use tracing::{error, info, warn};

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

#[derive(Debug, Clone)]
pub struct ConsoleOptions {
    /// Wait for Enter after each action before showing the menu again.
    pub pause_after_action: bool,
    pub default_symbol: String,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            pause_after_action: true,
            default_symbol: DEFAULT_SYMBOL.into(),
        }
    }
}

pub struct Console<E, R, W> {
    env: E,
    io: Prompter<R, W>,
    options: ConsoleOptions,
}

fn is_input_closed(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| cause.is::<InputClosed>())
}

impl<E, R, W> Console<E, R, W>
where
    E: Environment,
    R: BufRead,
    W: Write,
{
    pub fn new(env: E, input: R, output: W) -> Self {
        Self {
            env,
            io: Prompter::new(input, output),
            options: ConsoleOptions::default(),
        }
    }

    pub fn with_options(self, options: ConsoleOptions) -> Self {
        Self { options, ..self }
    }

    pub fn into_parts(self) -> (E, W) {
        (self.env, self.io.into_output())
    }

    /// Runs the menu loop until the user exits or input ends.
    pub async fn run(&mut self) -> Result<()> {
        write!(self.io.out(), "{}", menu::BANNER)?;
        info!("Console session started");

        loop {
            write!(self.io.out(), "{}", menu::MENU)?;

            let answer = match self.io.ask("Enter your choice (0-9)") {
                Ok(answer) => answer,
                Err(err) if is_input_closed(&err) => return self.farewell(),
                Err(err) => return Err(err),
            };

            match MenuChoice::from_str(&answer) {
                Ok(MenuChoice::Exit) => return self.farewell(),
                Ok(choice) => match self.dispatch(choice).await {
                    Ok(()) => {}
                    Err(err) if is_input_closed(&err) => return self.farewell(),
                    Err(err) => self.report(&err)?,
                },
                Err(err) => writeln!(self.io.out(), "\n {err}\n")?,
            }

            if self.options.pause_after_action {
                match self.io.pause() {
                    Ok(()) => {}
                    Err(err) if is_input_closed(&err) => return self.farewell(),
                    Err(err) => return Err(err),
                }
            }
        }
    }

    /// Logs and prints an action's failure.
    pub fn report(&mut self, err: &anyhow::Error) -> Result<()> {
        error!("{err:#}");
        writeln!(self.io.out(), "\n {err:#}\n")?;
        Ok(())
    }

    fn farewell(&mut self) -> Result<()> {
        let out = self.io.out();
        render::heading(out, "Thank you for using the futures order console!")?;
        writeln!(out)?;
        info!("Console session ended by user");
        Ok(())
    }

    /// Prompts for the parameters of `choice` and performs it.
    pub async fn dispatch(&mut self, choice: MenuChoice) -> Result<()> {
        match choice {
            MenuChoice::Exit => Ok(()),
            MenuChoice::ViewBalance => self.show_balance().await,
            MenuChoice::CheckPrice => {
                let symbol = self.ask_symbol("Enter symbol")?;
                self.show_price(&symbol).await
            }
            MenuChoice::PlaceMarketOrder => {
                render::heading(self.io.out(), "PLACE MARKET ORDER")?;
                let symbol = self.ask_symbol("Symbol")?;
                let side = self.ask_side()?;
                let quantity = self.ask_decimal("Quantity")?;
                self.submit_order(OrderRequest::create_market(&symbol, side, quantity))
                    .await
            }
            MenuChoice::PlaceLimitOrder => {
                render::heading(self.io.out(), "PLACE LIMIT ORDER")?;
                let symbol = self.ask_symbol("Symbol")?;
                if let Some(price) = self.current_price(&symbol).await {
                    writeln!(self.io.out(), " Current Price: ${}", price.to_plain_string())?;
                }
                let side = self.ask_side()?;
                let quantity = self.ask_decimal("Quantity")?;
                let price = self.ask_decimal("Limit Price")?;
                self.submit_order(OrderRequest::create_limit(&symbol, side, quantity, price))
                    .await
            }
            MenuChoice::PlaceStopLimitOrder => {
                render::heading(self.io.out(), "PLACE STOP-LIMIT ORDER")?;
                let symbol = self.ask_symbol("Symbol")?;
                if let Some(price) = self.current_price(&symbol).await {
                    let price = price.to_plain_string();
                    let out = self.io.out();
                    writeln!(out, " Current Price: ${price}")?;
                    writeln!(out, "\n Quick Guide:")?;
                    writeln!(out, "   BUY:  Stop price > {price} (breakout)")?;
                    writeln!(out, "   SELL: Stop price < {price} (stop-loss)")?;
                }
                let side = self.ask_side()?;
                let quantity = self.ask_decimal("Quantity")?;
                let stop_price = self.ask_decimal("Stop Price (trigger)")?;
                let price = self.ask_decimal("Limit Price (execution)")?;
                self.submit_order(OrderRequest::create_stop_limit(
                    &symbol, side, quantity, stop_price, price,
                ))
                .await
            }
            MenuChoice::ViewOpenOrders => {
                let symbol = self.ask_optional_symbol()?;
                self.show_open_orders(symbol.as_deref()).await
            }
            MenuChoice::ViewPositions => {
                let symbol = self.ask_optional_symbol()?;
                self.show_positions(symbol.as_deref()).await
            }
            MenuChoice::CancelOrder => {
                let symbol = self.ask_symbol("Enter symbol")?;
                let order_id: u64 = self.io.ask_parsed("Enter Order ID", "a whole number")?;
                self.cancel_order(&symbol, order_id).await
            }
            MenuChoice::CancelAllOrders => {
                let symbol = self.ask_symbol("Enter symbol")?;
                let confirm = self
                    .io
                    .ask(&format!(" Cancel ALL orders for {symbol}? (yes/no)"))?;
                if confirm.eq_ignore_ascii_case("yes") {
                    self.cancel_all_orders(&symbol).await
                } else {
                    writeln!(self.io.out(), " Cancelled.")?;
                    Ok(())
                }
            }
        }
    }

    fn ask_symbol(&mut self, prompt: &str) -> Result<String> {
        let prompt = format!("{prompt} (e.g., {})", self.options.default_symbol);
        let symbol = self
            .io
            .ask_with_default(&prompt, &self.options.default_symbol)?;
        Ok(symbol.to_ascii_uppercase())
    }

    fn ask_optional_symbol(&mut self) -> Result<Option<String>> {
        let symbol = self.io.ask_optional("Enter symbol (or press Enter for all)")?;
        Ok(symbol.map(|symbol| symbol.to_ascii_uppercase()))
    }

    fn ask_side(&mut self) -> Result<OrderSide> {
        self.io.ask_parsed("Side (BUY/SELL)", "BUY or SELL")
    }

    fn ask_decimal(&mut self, prompt: &str) -> Result<BigDecimal> {
        self.io.ask_parsed(prompt, "a number")
    }

    /// Best-effort price lookup used to guide input; failures are only logged.
    async fn current_price(&self, symbol: &str) -> Option<BigDecimal> {
        match self.env.get_price(symbol).await {
            Ok(ticker) => Some(ticker.price),
            Err(err) => {
                warn!(symbol, "Could not fetch current price: {err:#}");
                None
            }
        }
    }

    pub async fn show_balance(&mut self) -> Result<()> {
        let balances = self
            .env
            .get_balances()
            .await
            .context("Failed to fetch balance")?;
        info!(assets = balances.len(), "Balance fetched");
        render::balances(self.io.out(), &balances)?;
        Ok(())
    }

    pub async fn show_price(&mut self, symbol: &str) -> Result<()> {
        let ticker = self
            .env
            .get_price(symbol)
            .await
            .with_context(|| format!("Failed to fetch price for {symbol}"))?;
        info!(symbol, price = %ticker.price, "Price fetched");
        render::price(self.io.out(), &ticker)?;
        Ok(())
    }

    /// Validates `req` and submits it. Stop orders are also checked against the current price
    /// when it can be fetched.
    pub async fn submit_order(&mut self, req: OrderRequest) -> Result<()> {
        let market_price = if req.type_.requires_stop_price() {
            self.current_price(&req.symbol).await
        } else {
            None
        };
        if let Err(err) = req.validate(market_price.as_ref()) {
            warn!(symbol = %req.symbol, "Validation error: {err}");
            return Err(anyhow!(err).context("Order Error"));
        }

        info!(
            symbol = %req.symbol,
            side = %req.side,
            type_ = %req.type_,
            quantity = %req.quantity,
            "Placing order"
        );
        let order = self
            .env
            .place_order(req)
            .await
            .context("Order Failed")?;
        info!(order_id = order.order_id, status = %order.status, "Order placed successfully");
        render::placed_order(self.io.out(), &order)?;
        Ok(())
    }

    pub async fn show_open_orders(&mut self, symbol: Option<&str>) -> Result<()> {
        let orders = self
            .env
            .get_open_orders(symbol)
            .await
            .context("Failed to retrieve orders")?;
        info!(count = orders.len(), ?symbol, "Retrieved open orders");
        render::open_orders(self.io.out(), symbol, &orders)?;
        Ok(())
    }

    pub async fn show_positions(&mut self, symbol: Option<&str>) -> Result<()> {
        let positions = self
            .env
            .get_positions(symbol)
            .await
            .context("Failed to retrieve positions")?;
        let active = render::positions(self.io.out(), symbol, &positions)?;
        info!(active, ?symbol, "Retrieved active positions");
        Ok(())
    }

    pub async fn cancel_order(&mut self, symbol: &str, order_id: u64) -> Result<()> {
        let order = self
            .env
            .cancel_order(symbol, order_id)
            .await
            .context("Cancel failed")?;
        info!(order_id, symbol, "Order canceled");
        render::canceled_order(self.io.out(), &order)?;
        Ok(())
    }

    pub async fn cancel_all_orders(&mut self, symbol: &str) -> Result<()> {
        self.env
            .cancel_all_orders(symbol)
            .await
            .context("Failed to cancel all orders")?;
        info!(symbol, "All orders canceled");
        render::canceled_all(self.io.out(), symbol)?;
        Ok(())
    }
}
