// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub const INVALID_SYMBOL: i64 = -1121;
pub const UNKNOWN_ORDER: i64 = -2011;
pub const MARGIN_INSUFFICIENT: i64 = -2019;

/// A request rejected by the exchange, carrying the exchange's error code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

impl ApiError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_symbol() -> Self {
        Self::new(INVALID_SYMBOL, "Invalid symbol.")
    }

    pub fn unknown_order() -> Self {
        Self::new(UNKNOWN_ORDER, "Unknown order sent.")
    }

    pub fn margin_insufficient() -> Self {
        Self::new(MARGIN_INSUFFICIENT, "Margin is insufficient.")
    }
}
