// SPDX-License-Identifier: GPL-3.0-or-later

//! Wire shapes of the USDT-M Futures REST API. Decimal values arrive as JSON strings and are
//! kept as strings here; conversion into the [crate::api::common] types happens in
//! [super::converters].

use serde::Deserialize;
use serde_this_or_that::as_string;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BalanceResponse {
    pub asset: String,

    #[serde(deserialize_with = "as_string")]
    pub balance: String,

    #[serde(deserialize_with = "as_string")]
    pub available_balance: String,

    #[serde(default, deserialize_with = "as_string")]
    pub cross_un_pnl: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct TickerPriceResponse {
    pub symbol: String,

    #[serde(deserialize_with = "as_string")]
    pub price: String,

    #[serde(default)]
    pub time: Option<i64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderResponse {
    pub order_id: u64,

    #[serde(default)]
    pub client_order_id: String,

    pub symbol: String,

    pub status: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub side: String,

    #[serde(deserialize_with = "as_string")]
    pub orig_qty: String,

    #[serde(default, deserialize_with = "as_string")]
    pub executed_qty: String,

    #[serde(default, deserialize_with = "as_string")]
    pub price: String,

    #[serde(default, deserialize_with = "as_string")]
    pub avg_price: String,

    #[serde(default, deserialize_with = "as_string")]
    pub stop_price: String,

    #[serde(default)]
    pub update_time: Option<i64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PositionResponse {
    pub symbol: String,

    #[serde(deserialize_with = "as_string")]
    pub position_amt: String,

    #[serde(deserialize_with = "as_string")]
    pub entry_price: String,

    #[serde(default, deserialize_with = "as_string")]
    pub mark_price: String,

    #[serde(deserialize_with = "as_string")]
    pub un_realized_profit: String,

    #[serde(default, deserialize_with = "as_string")]
    pub leverage: String,
}

/// Body of every non-2xx response, e.g. `{"code":-1121,"msg":"Invalid symbol."}`.
#[derive(Deserialize, Debug)]
pub(crate) struct ErrorResponse {
    pub code: i64,
    pub msg: String,
}
