// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::client::Client;
use crate::api::market::Market;

/// A trading session: everything the console needs from an exchange.
pub trait Environment: Client + Market {}

impl<T> Environment for T where T: Client + Market {}
