// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::ApiError;
use crate::api::common::{Balance, Order, OrderSide, OrderStatus, OrderType, Position, TickerPrice};
use crate::binance::model::{
    BalanceResponse, ErrorResponse, OrderResponse, PositionResponse, TickerPriceResponse,
};
use anyhow::{Context, Result};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::str::FromStr;

impl From<ErrorResponse> for ApiError {
    fn from(error: ErrorResponse) -> Self {
        Self::new(error.code, error.msg)
    }
}

impl TryFrom<BalanceResponse> for Balance {
    type Error = anyhow::Error;

    fn try_from(balance: BalanceResponse) -> Result<Self> {
        Ok(Self {
            balance: decimal(&balance.balance)?,
            available_balance: decimal(&balance.available_balance)?,
            unrealized_pnl: decimal_or_zero(&balance.cross_un_pnl)?,
            asset: balance.asset,
        })
    }
}

impl TryFrom<TickerPriceResponse> for TickerPrice {
    type Error = anyhow::Error;

    fn try_from(ticker: TickerPriceResponse) -> Result<Self> {
        Ok(Self {
            price: decimal(&ticker.price)?,
            time: ticker.time.and_then(DateTime::<Utc>::from_timestamp_millis),
            symbol: ticker.symbol,
        })
    }
}

impl TryFrom<OrderResponse> for Order {
    type Error = anyhow::Error;

    fn try_from(order: OrderResponse) -> Result<Self> {
        Ok(Self {
            order_id: order.order_id,
            side: OrderSide::from_str(&order.side)?,
            type_: wire_order_type(&order.type_),
            status: order.status.as_str().into(),
            quantity: decimal(&order.orig_qty)?,
            filled_quantity: decimal_or_zero(&order.executed_qty)?,
            price: non_zero_decimal(&order.price)?,
            stop_price: non_zero_decimal(&order.stop_price)?,
            average_fill_price: non_zero_decimal(&order.avg_price)?,
            updated_at: order
                .update_time
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            client_order_id: order.client_order_id,
            symbol: order.symbol,
        })
    }
}

impl TryFrom<PositionResponse> for Position {
    type Error = anyhow::Error;

    fn try_from(position: PositionResponse) -> Result<Self> {
        Ok(Self {
            amount: decimal(&position.position_amt)?,
            entry_price: decimal(&position.entry_price)?,
            mark_price: decimal_or_zero(&position.mark_price)?,
            unrealized_pnl: decimal(&position.un_realized_profit)?,
            leverage: position.leverage.parse().ok(),
            symbol: position.symbol,
        })
    }
}

impl From<&str> for OrderStatus {
    fn from(status: &str) -> Self {
        match status {
            "NEW" => Self::New,
            "PARTIALLY_FILLED" => Self::PartiallyFilled,
            "FILLED" => Self::Filled,
            "CANCELED" => Self::Canceled,
            "REJECTED" => Self::Rejected,
            "EXPIRED" => Self::Expired,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

/// The `type` value the exchange expects for an order type.
pub(crate) fn to_wire_order_type(type_: &OrderType) -> &str {
    match type_ {
        OrderType::Market => "MARKET",
        OrderType::Limit => "LIMIT",
        OrderType::StopLimit => "STOP",
        OrderType::StopMarket => "STOP_MARKET",
        OrderType::Unrecognized(type_) => type_,
    }
}

fn wire_order_type(type_: &str) -> OrderType {
    match type_ {
        "MARKET" => OrderType::Market,
        "LIMIT" => OrderType::Limit,
        "STOP" => OrderType::StopLimit,
        "STOP_MARKET" => OrderType::StopMarket,
        other => OrderType::Unrecognized(other.to_string()),
    }
}

fn decimal(value: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(value).with_context(|| format!("Invalid decimal value '{value}'"))
}

fn decimal_or_zero(value: &str) -> Result<BigDecimal> {
    if value.is_empty() {
        return Ok(BigDecimal::from(0));
    }
    decimal(value)
}

/// The exchange reports absent prices as `"0"`.
fn non_zero_decimal(value: &str) -> Result<Option<BigDecimal>> {
    let value = decimal_or_zero(value)?;
    if value == BigDecimal::from(0) {
        return Ok(None);
    }
    Ok(Some(value))
}
