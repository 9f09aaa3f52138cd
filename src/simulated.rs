// Copyright (C) 2025 Agostinho Junior
// SPDX-License-Identifier: GPL-3.0-or-later

pub use exchange::SimulatedExchange;
pub use exchange::SimulatedExchangeBuilder;
mod exchange;

pub use client::SimulatedClient;
mod client;
