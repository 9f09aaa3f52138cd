// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Error, format_err};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    pub asset: String,
    pub balance: BigDecimal,
    pub available_balance: BigDecimal,
    pub unrealized_pnl: BigDecimal,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: BigDecimal,
    pub time: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub order_id: u64,
    pub client_order_id: String,
    pub symbol: String,
    pub side: OrderSide,
    pub type_: OrderType,
    pub status: OrderStatus,
    pub quantity: BigDecimal,
    pub filled_quantity: BigDecimal,
    pub price: Option<BigDecimal>,
    pub stop_price: Option<BigDecimal>,
    pub average_fill_price: Option<BigDecimal>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_open(&self) -> bool {
        matches!(self.status, OrderStatus::New | OrderStatus::PartiallyFilled)
    }
}

/// A futures position. `amount` is signed: positive for long, negative for short.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub symbol: String,
    pub amount: BigDecimal,
    pub entry_price: BigDecimal,
    pub mark_price: BigDecimal,
    pub unrealized_pnl: BigDecimal,
    pub leverage: Option<u32>,
}

impl Position {
    pub fn is_flat(&self) -> bool {
        self.amount == BigDecimal::from(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Expired,
    Unrecognized(String),
}

#[derive(Hash, PartialEq, Eq, Debug, Clone)]
pub enum OrderType {
    Market,
    Limit,
    StopLimit,
    StopMarket,
    /// A type reported by the exchange that orders cannot be placed with here.
    Unrecognized(String),
}

impl OrderType {
    pub fn requires_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }

    pub fn requires_stop_price(&self) -> bool {
        matches!(self, OrderType::StopLimit | OrderType::StopMarket)
    }
}

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl FromStr for OrderSide {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            _ => Err(format_err!("Side must be 'BUY' or 'SELL'")),
        }
    }
}

impl Display for OrderSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        })
    }
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            "STOP_LIMIT" | "STOP" => Ok(OrderType::StopLimit),
            "STOP_MARKET" => Ok(OrderType::StopMarket),
            _ => Err(format_err!(
                "Order type must be one of MARKET, LIMIT, STOP_LIMIT, STOP_MARKET"
            )),
        }
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::StopLimit => "STOP_LIMIT",
            OrderType::StopMarket => "STOP_MARKET",
            OrderType::Unrecognized(type_) => type_,
        })
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::New => f.write_str("NEW"),
            OrderStatus::PartiallyFilled => f.write_str("PARTIALLY_FILLED"),
            OrderStatus::Filled => f.write_str("FILLED"),
            OrderStatus::Canceled => f.write_str("CANCELED"),
            OrderStatus::Rejected => f.write_str("REJECTED"),
            OrderStatus::Expired => f.write_str("EXPIRED"),
            OrderStatus::Unrecognized(status) => f.write_str(status),
        }
    }
}
