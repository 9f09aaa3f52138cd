// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, Result, format_err};
use bigdecimal::BigDecimal;
use clap::Parser;
use futures_console::api::Environment;
use futures_console::api::common::{OrderSide, OrderType};
use futures_console::batch::{self, BatchPlan};
use futures_console::binance::BinanceClient;
use futures_console::config::{
    API_KEY_VAR, API_SECRET_VAR, ApiCredentials, DEFAULT_RECV_WINDOW, ExchangeConfig,
    TESTNET_BASE_URL,
};
use futures_console::console::{Console, ConsoleOptions};
use futures_console::logging;
use futures_console::simulated::{SimulatedClient, SimulatedExchangeBuilder};
use std::io;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Order console for the Binance USDT-M Futures testnet.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// API key
    #[arg(long, env = API_KEY_VAR, hide_env_values = true, required_unless_present = "simulated")]
    api_key: Option<String>,

    /// API secret
    #[arg(long, env = API_SECRET_VAR, hide_env_values = true, required_unless_present = "simulated")]
    api_secret: Option<String>,

    /// Run the interactive menu
    #[arg(short, long)]
    interactive: bool,

    /// Use an in-process simulated exchange instead of the testnet
    #[arg(long)]
    simulated: bool,

    #[arg(long, default_value = TESTNET_BASE_URL)]
    base_url: String,

    /// Validity window of signed requests, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RECV_WINDOW)]
    recv_window: u64,

    /// Show the menu again straight after each action
    #[arg(long)]
    no_pause: bool,

    #[arg(long, default_value = "trading_bot.log")]
    log_file: PathBuf,

    /// Trading pair, e.g. BTCUSDT (required without --interactive)
    #[arg(long)]
    symbol: Option<String>,

    /// BUY or SELL
    #[arg(long)]
    side: Option<OrderSide>,

    /// MARKET, LIMIT, STOP_LIMIT or STOP_MARKET
    #[arg(long = "type")]
    type_: Option<OrderType>,

    #[arg(long)]
    quantity: Option<BigDecimal>,

    /// Limit price
    #[arg(long)]
    price: Option<BigDecimal>,

    /// Trigger price of stop orders
    #[arg(long)]
    stop_price: Option<BigDecimal>,

    #[arg(long)]
    show_price: bool,

    #[arg(long)]
    show_orders: bool,

    #[arg(long)]
    show_positions: bool,

    /// Order ID to cancel
    #[arg(long)]
    cancel_order: Option<u64>,

    /// Cancel all open orders for --symbol
    #[arg(long)]
    cancel_all: bool,
}

impl Cli {
    fn exchange_config(&self) -> Result<ExchangeConfig> {
        let credentials = match (&self.api_key, &self.api_secret) {
            (Some(api_key), Some(api_secret)) => ApiCredentials::new(api_key, api_secret),
            _ => ApiCredentials::from_env()?,
        };
        Ok(ExchangeConfig::testnet(credentials)
            .with_base_url(&self.base_url)
            .with_recv_window(self.recv_window))
    }

    fn batch_plan(&self) -> Result<BatchPlan> {
        let symbol = self
            .symbol
            .as_deref()
            .ok_or(format_err!("--symbol is required in command-line mode"))?;
        Ok(BatchPlan {
            show_price: self.show_price,
            side: self.side,
            type_: self.type_.clone(),
            quantity: self.quantity.clone(),
            price: self.price.clone(),
            stop_price: self.stop_price.clone(),
            show_orders: self.show_orders,
            show_positions: self.show_positions,
            cancel_order: self.cancel_order,
            cancel_all: self.cancel_all,
            ..BatchPlan::new(symbol)
        })
    }
}

fn simulated_client() -> Result<SimulatedClient> {
    let exchange = SimulatedExchangeBuilder::new("USDT")
        .set_balance("USDT", BigDecimal::from(10_000))
        .set_mark_price("BTCUSDT", BigDecimal::from(65_000))
        .set_mark_price("ETHUSDT", BigDecimal::from(3_200))
        .build()?;
    Ok(SimulatedClient::new(exchange))
}

async fn session<E: Environment>(env: E, cli: &Cli) -> Result<()> {
    if cli.interactive {
        let options = ConsoleOptions {
            pause_after_action: !cli.no_pause,
            ..Default::default()
        };
        let mut console = Console::new(env, io::stdin().lock(), io::stdout()).with_options(options);
        return console.run().await;
    }

    let plan = cli.batch_plan()?;
    let (_, failed) = batch::run(env, &plan, io::stdout()).await?;
    if failed > 0 {
        warn!(failed, "Some actions failed");
    }
    Ok(())
}

async fn start(cli: Cli) -> Result<()> {
    if !cli.interactive && cli.symbol.is_none() {
        return Err(format_err!("--symbol is required in command-line mode"));
    }

    if cli.simulated {
        info!("Starting with the simulated exchange");
        return session(simulated_client()?, &cli).await;
    }

    let client = BinanceClient::connect(cli.exchange_config()?).await?;
    session(client, &cli).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_file)?;

    start(cli).await.inspect_err(|err| error!("{err:#}")).context("Failed to run the console")
}
