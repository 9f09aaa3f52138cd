// SPDX-License-Identifier: GPL-3.0-or-later

//! Text rendering of exchange responses.

use crate::api::common::{Balance, Order, Position, TickerPrice};
use bigdecimal::{BigDecimal, RoundingMode};
use std::io::{Result, Write};

const WIDE: usize = 60;
const WIDER: usize = 90;

fn rule(out: &mut impl Write, width: usize) -> Result<()> {
    writeln!(out, "{}", "=".repeat(width))
}

fn fixed(value: &BigDecimal, scale: i64) -> String {
    value
        .with_scale_round(scale, RoundingMode::HalfUp)
        .to_plain_string()
}

pub fn heading(out: &mut impl Write, title: &str) -> Result<()> {
    writeln!(out)?;
    rule(out, WIDE)?;
    writeln!(out, " {title}")?;
    rule(out, WIDE)
}

pub fn balances(out: &mut impl Write, balances: &[Balance]) -> Result<()> {
    heading(out, "ACCOUNT BALANCES")?;
    let funded: Vec<&Balance> = balances
        .iter()
        .filter(|balance| balance.balance > BigDecimal::from(0))
        .collect();
    if funded.is_empty() {
        writeln!(out, "  No assets with a positive balance")?;
    }
    for balance in funded {
        writeln!(
            out,
            "  {:8}: {:>20} (available {})",
            balance.asset,
            fixed(&balance.balance, 8),
            fixed(&balance.available_balance, 8)
        )?;
    }
    rule(out, WIDE)?;
    writeln!(out)
}

pub fn price(out: &mut impl Write, ticker: &TickerPrice) -> Result<()> {
    heading(out, "CURRENT MARKET PRICE")?;
    writeln!(out, "  Symbol: {}", ticker.symbol)?;
    writeln!(out, "  Price:  ${}", fixed(&ticker.price, 2))?;
    rule(out, WIDE)?;
    writeln!(out)
}

pub fn placed_order(out: &mut impl Write, order: &Order) -> Result<()> {
    heading(out, "ORDER PLACED SUCCESSFULLY!")?;
    writeln!(out, "  Order ID:   {}", order.order_id)?;
    writeln!(out, "  Symbol:     {}", order.symbol)?;
    writeln!(out, "  Side:       {}", order.side)?;
    writeln!(out, "  Type:       {}", order.type_)?;
    writeln!(out, "  Quantity:   {}", order.quantity.to_plain_string())?;
    writeln!(out, "  Status:     {}", order.status)?;
    if let Some(price) = &order.price {
        writeln!(out, "  Price:      {}", price.to_plain_string())?;
    }
    if let Some(stop_price) = &order.stop_price {
        writeln!(out, "  Stop Price: {}", stop_price.to_plain_string())?;
    }
    if let Some(average_fill_price) = &order.average_fill_price {
        writeln!(out, "  Avg Fill:   {}", average_fill_price.to_plain_string())?;
    }
    rule(out, WIDE)?;
    writeln!(out)
}

fn scope(symbol: Option<&str>) -> String {
    symbol.map(|symbol| format!(" for {symbol}")).unwrap_or_default()
}

pub fn open_orders(out: &mut impl Write, symbol: Option<&str>, orders: &[Order]) -> Result<()> {
    if orders.is_empty() {
        return writeln!(out, "\n No open orders{}\n", scope(symbol));
    }
    writeln!(out)?;
    rule(out, WIDER)?;
    writeln!(out, " OPEN ORDERS{}", scope(symbol).to_uppercase())?;
    rule(out, WIDER)?;
    for order in orders {
        let price = order
            .price
            .as_ref()
            .map(BigDecimal::to_plain_string)
            .unwrap_or("N/A".into());
        let stop_price = order
            .stop_price
            .as_ref()
            .map(|stop_price| format!(" | Stop: {}", stop_price.to_plain_string()))
            .unwrap_or_default();
        writeln!(
            out,
            "  ID: {:>12} | {:10} | Side: {:4} | Type: {:11} | Qty: {:>10} | Price: {}{}",
            order.order_id,
            order.symbol,
            order.side.to_string(),
            order.type_.to_string(),
            order.quantity.to_plain_string(),
            price,
            stop_price
        )?;
    }
    rule(out, WIDER)?;
    writeln!(out)
}

/// Renders the positions that are not flat and returns how many that was.
pub fn positions(
    out: &mut impl Write,
    symbol: Option<&str>,
    positions: &[Position],
) -> Result<usize> {
    let active: Vec<&Position> = positions.iter().filter(|position| !position.is_flat()).collect();
    if active.is_empty() {
        writeln!(out, "\n No active positions{}\n", scope(symbol))?;
        return Ok(0);
    }
    writeln!(out)?;
    rule(out, WIDER)?;
    writeln!(out, " ACTIVE POSITIONS{}", scope(symbol).to_uppercase())?;
    rule(out, WIDER)?;
    for position in &active {
        writeln!(
            out,
            "  Symbol: {:10} | Position: {:>10} | Entry: {:>12} | Mark: {:>12} | PnL: ${:>10}",
            position.symbol,
            position.amount.to_plain_string(),
            fixed(&position.entry_price, 2),
            fixed(&position.mark_price, 2),
            fixed(&position.unrealized_pnl, 2)
        )?;
    }
    rule(out, WIDER)?;
    writeln!(out)?;
    Ok(active.len())
}

pub fn canceled_order(out: &mut impl Write, order: &Order) -> Result<()> {
    writeln!(out, "\n Order {} canceled for {}\n", order.order_id, order.symbol)
}

pub fn canceled_all(out: &mut impl Write, symbol: &str) -> Result<()> {
    writeln!(out, "\n All orders canceled for {symbol}\n")
}
