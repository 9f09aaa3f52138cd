// Copyright (C) 2025 Agostinho Junior
// SPDX-License-Identifier: GPL-3.0-or-later

pub use client::BinanceClient;
pub use client::sign;
mod client;

mod converters;
mod model;
