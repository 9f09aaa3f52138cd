// SPDX-License-Identifier: GPL-3.0-or-later

//! Connection settings for the live exchange.
//!
//! Values normally come from the command line; the credentials can also be supplied through the
//! `BINANCE_API_KEY` and `BINANCE_API_SECRET` environment variables.

use anyhow::{Context, Result};
use std::env;
use std::fmt::{Debug, Formatter};

pub const TESTNET_BASE_URL: &str = "https://testnet.binancefuture.com";
pub const DEFAULT_RECV_WINDOW: u64 = 5000;

pub const API_KEY_VAR: &str = "BINANCE_API_KEY";
pub const API_SECRET_VAR: &str = "BINANCE_API_SECRET";

#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    api_key: String,
    api_secret: String,
}

impl ApiCredentials {
    pub fn new(api_key: &str, api_secret: &str) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_VAR).with_context(|| format!("{API_KEY_VAR} is not set"))?;
        let api_secret =
            env::var(API_SECRET_VAR).with_context(|| format!("{API_SECRET_VAR} is not set"))?;
        Ok(Self::new(&api_key, &api_secret))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl Debug for ApiCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeConfig {
    pub credentials: ApiCredentials,
    pub base_url: String,
    /// Milliseconds a signed request stays valid after its timestamp.
    pub recv_window: u64,
}

impl ExchangeConfig {
    pub fn testnet(credentials: ApiCredentials) -> Self {
        Self {
            credentials,
            base_url: TESTNET_BASE_URL.into(),
            recv_window: DEFAULT_RECV_WINDOW,
        }
    }

    pub fn with_base_url(self, base_url: &str) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }

    pub fn with_recv_window(self, recv_window: u64) -> Self {
        Self {
            recv_window,
            ..self
        }
    }
}
