// SPDX-License-Identifier: GPL-3.0-or-later

//! An order console for USDT-margined perpetual futures.
//!
//! The [console] drives any [api::Environment]: the live [binance] testnet client or the
//! in-memory [simulated] exchange.

pub mod api;
pub mod batch;
#[cfg(feature = "live")]
pub mod binance;
pub mod config;
pub mod console;
pub mod logging;
pub mod simulated;
