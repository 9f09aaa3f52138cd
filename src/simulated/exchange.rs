// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::ApiError;
use crate::api::common::{Balance, Order, OrderSide, OrderStatus, OrderType, Position};
use crate::api::request::OrderRequest;
use anyhow::{Result, format_err};
use bigdecimal::BigDecimal;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// An in-process USDT-margined futures exchange.
///
/// Orders are matched against a mark price per symbol that is set from the outside with
/// [SimulatedExchange::set_mark_price]; there is no order book.
#[derive(Debug)]
pub struct SimulatedExchange {
    margin_assets: HashSet<String>,
    wallet_balances: HashMap<String, BigDecimal>,
    mark_prices: HashMap<String, BigDecimal>,
    orders: BTreeMap<u64, Order>,
    /// Stop orders whose stop price has been reached; they now work as plain orders.
    triggered: HashSet<u64>,
    positions: HashMap<String, NetPosition>,
    leverage: u32,
    next_order_id: u64,
}

#[derive(Debug, Clone)]
struct NetPosition {
    amount: BigDecimal,
    entry_price: BigDecimal,
}

pub struct SimulatedExchangeBuilder {
    margin_assets: HashSet<String>,
    wallet_balances: HashMap<String, BigDecimal>,
    mark_prices: HashMap<String, BigDecimal>,
    leverage: u32,
}

impl SimulatedExchangeBuilder {
    pub fn new(margin_asset: &str) -> Self {
        let mut margin_assets = HashSet::new();
        margin_assets.insert(margin_asset.to_string());
        let mut wallet_balances = HashMap::new();
        wallet_balances.insert(margin_asset.to_string(), BigDecimal::from(0));
        Self {
            margin_assets,
            wallet_balances,
            mark_prices: HashMap::new(),
            leverage: 20,
        }
    }

    pub fn set_balance(&mut self, asset: &str, balance: BigDecimal) -> &mut Self {
        self.margin_assets.insert(asset.into());
        self.wallet_balances.insert(asset.into(), balance);
        self
    }

    pub fn set_mark_price(&mut self, symbol: &str, price: BigDecimal) -> &mut Self {
        self.mark_prices.insert(symbol.into(), price);
        self
    }

    pub fn set_leverage(&mut self, leverage: u32) -> Result<&mut Self> {
        if leverage == 0 {
            return Err(format_err!("Leverage must be at least 1"));
        }
        self.leverage = leverage;
        Ok(self)
    }

    pub fn build(&self) -> Result<SimulatedExchange> {
        let mut exchange = SimulatedExchange {
            margin_assets: self.margin_assets.clone(),
            wallet_balances: self.wallet_balances.clone(),
            mark_prices: HashMap::new(),
            orders: BTreeMap::new(),
            triggered: HashSet::new(),
            positions: HashMap::new(),
            leverage: self.leverage,
            next_order_id: 1,
        };
        for (symbol, price) in &self.mark_prices {
            exchange.set_mark_price(symbol, price.clone())?;
        }
        Ok(exchange)
    }
}

impl SimulatedExchange {
    pub fn leverage(&self) -> u32 {
        self.leverage
    }

    pub fn place_order(&mut self, req: OrderRequest) -> Result<Order> {
        let mark_price = self.get_mark_price(&req.symbol)?;

        if let OrderType::Unrecognized(_) = req.type_ {
            return Err(ApiError::new(-1116, "Invalid orderType.").into());
        }
        if req.quantity <= BigDecimal::from(0) {
            return Err(ApiError::new(-4003, "Quantity less than or equal to zero.").into());
        }

        let margin_asset = self.get_margin_asset(&req.symbol)?;
        let reference_price = req.price.clone().unwrap_or(mark_price);
        let margin_needed = self.initial_margin(&req.quantity, &reference_price);
        if self.get_available_balance(&margin_asset) < margin_needed {
            return Err(ApiError::margin_insufficient().into());
        }

        let order_id = self.next_order_id;
        self.next_order_id += 1;

        let order = Order {
            order_id,
            client_order_id: req.client_order_id,
            symbol: req.symbol,
            side: req.side,
            type_: req.type_,
            status: OrderStatus::New,
            quantity: req.quantity,
            filled_quantity: BigDecimal::from(0),
            price: req.price,
            stop_price: req.stop_price,
            average_fill_price: None,
            updated_at: Some(Utc::now()),
        };

        debug!(order_id, symbol = %order.symbol, "simulated order accepted");
        self.orders.insert(order_id, order);
        self.maybe_update_order(order_id)?;

        self.get_order(order_id)
    }

    /// Fills or triggers an open order if the current mark price allows it.
    fn maybe_update_order(&mut self, order_id: u64) -> Result<()> {
        let order = self.get_order(order_id)?;
        if !order.is_open() {
            return Ok(());
        }
        let mark_price = self.get_mark_price(&order.symbol)?;

        let awaiting_trigger = !self.triggered.contains(&order_id);
        if let Some(stop_price) = order.stop_price.as_ref().filter(|_| awaiting_trigger) {
            let triggered = match order.side {
                OrderSide::Buy => &mark_price >= stop_price,
                OrderSide::Sell => &mark_price <= stop_price,
            };
            if !triggered {
                return Ok(());
            }
            debug!(order_id, stop_price = %stop_price, "simulated stop triggered");
            self.triggered.insert(order_id);
        }

        let fill = match (&order.type_, &order.price) {
            (OrderType::Market | OrderType::StopMarket, _) => true,
            (OrderType::Limit | OrderType::StopLimit, Some(limit_price)) => {
                &mark_price == limit_price
                    || ((order.side == OrderSide::Buy) == (&mark_price < limit_price))
            }
            (OrderType::Limit | OrderType::StopLimit, None) | (OrderType::Unrecognized(_), _) => {
                false
            }
        };

        if fill {
            self.fill_order_immediately(order_id, mark_price)?;
        }

        Ok(())
    }

    fn fill_order_immediately(&mut self, order_id: u64, fill_price: BigDecimal) -> Result<()> {
        let order = self.get_order(order_id)?;
        let signed_quantity = match order.side {
            OrderSide::Buy => order.quantity.clone(),
            OrderSide::Sell => -order.quantity.clone(),
        };

        let realized_pnl = self.update_position(&order.symbol, signed_quantity, &fill_price);
        let margin_asset = self.get_margin_asset(&order.symbol)?;
        self.update_balance(&margin_asset, realized_pnl);

        self.orders.insert(
            order_id,
            Order {
                filled_quantity: order.quantity.clone(),
                average_fill_price: Some(fill_price),
                status: OrderStatus::Filled,
                updated_at: Some(Utc::now()),
                ..order
            },
        );

        Ok(())
    }

    /// Nets a fill into the symbol's position and returns the realized PnL.
    fn update_position(
        &mut self,
        symbol: &str,
        signed_quantity: BigDecimal,
        fill_price: &BigDecimal,
    ) -> BigDecimal {
        let zero = BigDecimal::from(0);
        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| NetPosition {
                amount: BigDecimal::from(0),
                entry_price: BigDecimal::from(0),
            });

        let same_direction = position.amount == zero
            || (position.amount > zero) == (signed_quantity > zero);

        if same_direction {
            let new_amount = &position.amount + &signed_quantity;
            let weighted = &position.entry_price * position.amount.abs()
                + fill_price * signed_quantity.abs();
            position.entry_price = weighted / new_amount.abs();
            position.amount = new_amount;
            return zero;
        }

        let closed = if position.amount.abs() < signed_quantity.abs() {
            position.amount.abs()
        } else {
            signed_quantity.abs()
        };
        let direction = if position.amount > zero {
            BigDecimal::from(1)
        } else {
            BigDecimal::from(-1)
        };
        let realized_pnl = closed * (fill_price - &position.entry_price) * direction;

        let new_amount = &position.amount + &signed_quantity;
        if new_amount == zero {
            position.entry_price = BigDecimal::from(0);
        } else if (new_amount > zero) != (position.amount > zero) {
            position.entry_price = fill_price.clone();
        }
        position.amount = new_amount;

        realized_pnl
    }

    pub fn cancel_order(&mut self, symbol: &str, order_id: u64) -> Result<Order> {
        let order = self
            .orders
            .get_mut(&order_id)
            .filter(|order| order.symbol == symbol && order.is_open())
            .ok_or(ApiError::unknown_order())?;
        order.status = OrderStatus::Canceled;
        order.updated_at = Some(Utc::now());
        Ok(order.clone())
    }

    /// Cancels every open order for `symbol` and returns how many were canceled.
    pub fn cancel_all_orders(&mut self, symbol: &str) -> Result<usize> {
        self.get_mark_price(symbol)?;
        let mut canceled = 0;
        for order in self.orders.values_mut() {
            if order.symbol == symbol && order.is_open() {
                order.status = OrderStatus::Canceled;
                order.updated_at = Some(Utc::now());
                canceled += 1;
            }
        }
        Ok(canceled)
    }

    pub fn get_order(&self, order_id: u64) -> Result<Order> {
        self.orders
            .get(&order_id)
            .cloned()
            .ok_or(format_err!("Order with id {} doesn't exist", order_id))
    }

    pub fn get_open_orders(&self, symbol: Option<&str>) -> Vec<Order> {
        self.orders
            .values()
            .filter(|order| order.is_open())
            .filter(|order| symbol.is_none_or(|symbol| order.symbol == symbol))
            .cloned()
            .collect()
    }

    pub fn get_positions(&self, symbol: Option<&str>) -> Result<Vec<Position>> {
        if let Some(symbol) = symbol {
            self.get_mark_price(symbol)?;
        }
        let mut symbols: Vec<&String> = self
            .mark_prices
            .keys()
            .filter(|key| symbol.is_none_or(|symbol| *key == symbol))
            .collect();
        symbols.sort();

        symbols
            .into_iter()
            .map(|symbol| self.get_position(symbol))
            .collect()
    }

    fn get_position(&self, symbol: &str) -> Result<Position> {
        let mark_price = self.get_mark_price(symbol)?;
        let (amount, entry_price) = self
            .positions
            .get(symbol)
            .map(|position| (position.amount.clone(), position.entry_price.clone()))
            .unwrap_or((BigDecimal::from(0), BigDecimal::from(0)));
        let unrealized_pnl = if amount == BigDecimal::from(0) {
            BigDecimal::from(0)
        } else {
            &amount * (&mark_price - &entry_price)
        };
        Ok(Position {
            symbol: symbol.into(),
            amount,
            entry_price,
            mark_price,
            unrealized_pnl,
            leverage: Some(self.leverage),
        })
    }

    pub fn get_balances(&self) -> Vec<Balance> {
        let mut assets: Vec<&String> = self.margin_assets.iter().collect();
        assets.sort();
        assets
            .into_iter()
            .map(|asset| Balance {
                asset: asset.clone(),
                balance: self.get_wallet_balance(asset),
                available_balance: self.get_available_balance(asset),
                unrealized_pnl: self.get_unrealized_pnl(asset),
            })
            .collect()
    }

    pub fn get_wallet_balance(&self, asset: &str) -> BigDecimal {
        self.wallet_balances
            .get(asset)
            .cloned()
            .unwrap_or(BigDecimal::from(0))
    }

    /// Wallet balance plus unrealized PnL, minus the margin held by positions and open orders.
    pub fn get_available_balance(&self, asset: &str) -> BigDecimal {
        let mut locked = BigDecimal::from(0);
        for order in self.orders.values().filter(|order| order.is_open()) {
            if self.is_margined_in(&order.symbol, asset) {
                let price = order
                    .price
                    .clone()
                    .or_else(|| self.mark_prices.get(&order.symbol).cloned())
                    .unwrap_or(BigDecimal::from(0));
                locked += self.initial_margin(&order.quantity, &price);
            }
        }
        for (symbol, position) in &self.positions {
            if self.is_margined_in(symbol, asset) {
                let mark_price = self
                    .mark_prices
                    .get(symbol)
                    .cloned()
                    .unwrap_or(BigDecimal::from(0));
                locked += self.initial_margin(&position.amount.abs(), &mark_price);
            }
        }
        self.get_wallet_balance(asset) + self.get_unrealized_pnl(asset) - locked
    }

    fn get_unrealized_pnl(&self, asset: &str) -> BigDecimal {
        let mut pnl = BigDecimal::from(0);
        for (symbol, position) in &self.positions {
            if let (true, Some(mark_price)) = (
                self.is_margined_in(symbol, asset),
                self.mark_prices.get(symbol),
            ) {
                pnl += &position.amount * (mark_price - &position.entry_price);
            }
        }
        pnl
    }

    fn initial_margin(&self, quantity: &BigDecimal, price: &BigDecimal) -> BigDecimal {
        quantity * price / BigDecimal::from(self.leverage)
    }

    pub fn get_mark_price(&self, symbol: &str) -> Result<BigDecimal> {
        self.mark_prices
            .get(symbol)
            .cloned()
            .ok_or(ApiError::invalid_symbol().into())
    }

    pub fn set_mark_price(&mut self, symbol: &str, price: BigDecimal) -> Result<()> {
        self.get_margin_asset(symbol)?;
        self.mark_prices.insert(symbol.into(), price);

        let order_ids: Vec<u64> = self
            .orders
            .values()
            .filter(|order| order.symbol == symbol && order.is_open())
            .map(|order| order.order_id)
            .collect();
        for order_id in order_ids {
            self.maybe_update_order(order_id)?
        }

        Ok(())
    }

    fn get_margin_asset(&self, symbol: &str) -> Result<String> {
        self.margin_assets
            .iter()
            .find(|asset| symbol.len() > asset.len() && symbol.ends_with(asset.as_str()))
            .cloned()
            .ok_or(format_err!("{} is not quoted in a margin asset", symbol))
    }

    fn is_margined_in(&self, symbol: &str, asset: &str) -> bool {
        self.get_margin_asset(symbol)
            .map(|margin_asset| margin_asset == asset)
            .unwrap_or(false)
    }

    fn update_balance(&mut self, asset: &str, delta: BigDecimal) {
        let previous_balance = self.get_wallet_balance(asset);
        self.wallet_balances
            .insert(asset.into(), previous_balance + delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn num(value: &str) -> BigDecimal {
        BigDecimal::from_str(value).unwrap()
    }

    fn create_exchange() -> SimulatedExchange {
        SimulatedExchangeBuilder::new("USDT")
            .set_balance("USDT", num("1000"))
            .set_mark_price("BTCUSDT", num("100"))
            .set_leverage(10)
            .unwrap()
            .build()
            .unwrap()
    }

    fn api_error(err: &anyhow::Error) -> &ApiError {
        err.downcast_ref::<ApiError>().unwrap()
    }

    #[test]
    fn place_order_invalid_symbol() {
        let mut exchange = create_exchange();
        let err = exchange
            .place_order(OrderRequest::create_market("ETHUSDT", OrderSide::Buy, num("1")))
            .unwrap_err();
        assert_eq!(api_error(&err), &ApiError::invalid_symbol());
        assert_eq!(err.to_string(), "Invalid symbol. (code -1121)");
    }

    #[test]
    fn place_order_margin_insufficient() {
        let mut exchange = create_exchange();
        // 101 * 100 / 10 = 1010 > 1000
        let err = exchange
            .place_order(OrderRequest::create_market("BTCUSDT", OrderSide::Buy, num("101")))
            .unwrap_err();
        assert_eq!(api_error(&err).code, -2019);
    }

    #[test]
    fn place_order_close_but_enough_margin() -> Result<()> {
        let mut exchange = create_exchange();
        let order = exchange.place_order(OrderRequest::create_market(
            "BTCUSDT",
            OrderSide::Buy,
            num("100"),
        ))?;
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(exchange.get_available_balance("USDT"), num("0"));
        Ok(())
    }

    #[test]
    fn place_order_rejects_zero_quantity() {
        let mut exchange = create_exchange();
        let err = exchange
            .place_order(OrderRequest::create_market("BTCUSDT", OrderSide::Buy, num("0")))
            .unwrap_err();
        assert_eq!(api_error(&err).code, -4003);
    }

    #[test]
    fn market_order_fills_at_mark_price() -> Result<()> {
        let mut exchange = create_exchange();
        let req = OrderRequest::create_market("BTCUSDT", OrderSide::Buy, num("2"));
        let client_order_id = req.client_order_id.clone();

        let order = exchange.place_order(req)?;

        assert_eq!(order.order_id, 1);
        assert_eq!(order.client_order_id, client_order_id);
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.filled_quantity, num("2"));
        assert_eq!(order.average_fill_price, Some(num("100")));

        let positions = exchange.get_positions(Some("BTCUSDT"))?;
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].amount, num("2"));
        assert_eq!(positions[0].entry_price, num("100"));
        assert_eq!(positions[0].unrealized_pnl, num("0"));

        // 2 * 100 / 10 held as position margin
        assert_eq!(exchange.get_available_balance("USDT"), num("980"));
        assert_eq!(exchange.get_wallet_balance("USDT"), num("1000"));
        Ok(())
    }

    #[test]
    fn order_ids_increase() -> Result<()> {
        let mut exchange = create_exchange();
        let first = exchange.place_order(OrderRequest::create_limit(
            "BTCUSDT",
            OrderSide::Buy,
            num("1"),
            num("90"),
        ))?;
        let second = exchange.place_order(OrderRequest::create_limit(
            "BTCUSDT",
            OrderSide::Buy,
            num("1"),
            num("91"),
        ))?;
        assert_eq!(second.order_id, first.order_id + 1);
        Ok(())
    }

    #[test]
    fn limit_buy_rests_until_price_drops() -> Result<()> {
        let mut exchange = create_exchange();
        let order = exchange.place_order(OrderRequest::create_limit(
            "BTCUSDT",
            OrderSide::Buy,
            num("1"),
            num("95"),
        ))?;
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(exchange.get_open_orders(None).len(), 1);
        // 1 * 95 / 10 reserved by the open order
        assert_eq!(exchange.get_available_balance("USDT"), num("990.5"));

        exchange.set_mark_price("BTCUSDT", num("96"))?;
        assert_eq!(exchange.get_order(order.order_id)?.status, OrderStatus::New);

        exchange.set_mark_price("BTCUSDT", num("94"))?;
        let order = exchange.get_order(order.order_id)?;
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.average_fill_price, Some(num("94")));
        assert!(exchange.get_open_orders(None).is_empty());
        Ok(())
    }

    #[test]
    fn marketable_limit_sell_fills_immediately() -> Result<()> {
        let mut exchange = create_exchange();
        let order = exchange.place_order(OrderRequest::create_limit(
            "BTCUSDT",
            OrderSide::Sell,
            num("1"),
            num("99"),
        ))?;
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.average_fill_price, Some(num("100")));
        assert_eq!(exchange.get_positions(None)?[0].amount, num("-1"));
        Ok(())
    }

    #[test]
    fn stop_limit_buy_triggers_then_fills() -> Result<()> {
        let mut exchange = create_exchange();
        let order = exchange.place_order(OrderRequest::create_stop_limit(
            "BTCUSDT",
            OrderSide::Buy,
            num("1"),
            num("110"),
            num("112"),
        ))?;
        assert_eq!(order.status, OrderStatus::New);

        exchange.set_mark_price("BTCUSDT", num("109"))?;
        assert_eq!(exchange.get_order(order.order_id)?.status, OrderStatus::New);

        exchange.set_mark_price("BTCUSDT", num("111"))?;
        let order = exchange.get_order(order.order_id)?;
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.average_fill_price, Some(num("111")));
        Ok(())
    }

    #[test]
    fn triggered_stop_limit_rests_when_price_gaps_past_limit() -> Result<()> {
        let mut exchange = create_exchange();
        let order = exchange.place_order(OrderRequest::create_stop_limit(
            "BTCUSDT",
            OrderSide::Buy,
            num("1"),
            num("110"),
            num("110"),
        ))?;

        exchange.set_mark_price("BTCUSDT", num("120"))?;
        assert_eq!(exchange.get_order(order.order_id)?.status, OrderStatus::New);

        exchange.set_mark_price("BTCUSDT", num("110"))?;
        assert_eq!(
            exchange.get_order(order.order_id)?.status,
            OrderStatus::Filled
        );
        Ok(())
    }

    #[test]
    fn triggered_stop_limit_fills_after_price_retreats_below_stop() -> Result<()> {
        let mut exchange = create_exchange();
        let order = exchange.place_order(OrderRequest::create_stop_limit(
            "BTCUSDT",
            OrderSide::Buy,
            num("1"),
            num("110"),
            num("108"),
        ))?;

        exchange.set_mark_price("BTCUSDT", num("120"))?;
        assert_eq!(exchange.get_order(order.order_id)?.status, OrderStatus::New);

        exchange.set_mark_price("BTCUSDT", num("107"))?;
        let order = exchange.get_order(order.order_id)?;
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.average_fill_price, Some(num("107")));
        Ok(())
    }

    #[test]
    fn stop_limit_waits_for_trigger_before_working_as_limit() -> Result<()> {
        let mut exchange = create_exchange();
        let order = exchange.place_order(OrderRequest::create_stop_limit(
            "BTCUSDT",
            OrderSide::Sell,
            num("1"),
            num("90"),
            num("92"),
        ))?;

        exchange.set_mark_price("BTCUSDT", num("95"))?;
        assert_eq!(exchange.get_order(order.order_id)?.status, OrderStatus::New);

        exchange.set_mark_price("BTCUSDT", num("89"))?;
        assert_eq!(exchange.get_order(order.order_id)?.status, OrderStatus::New);

        exchange.set_mark_price("BTCUSDT", num("93"))?;
        assert_eq!(
            exchange.get_order(order.order_id)?.status,
            OrderStatus::Filled
        );
        Ok(())
    }

    #[test]
    fn place_order_unrecognized_type() {
        let mut exchange = create_exchange();
        let err = exchange
            .place_order(OrderRequest::create(
                "BTCUSDT",
                OrderSide::Buy,
                OrderType::Unrecognized("TAKE_PROFIT".into()),
                num("1"),
                Some(num("100")),
                Some(num("100")),
            ))
            .unwrap_err();
        assert_eq!(api_error(&err).code, -1116);
        assert!(exchange.get_open_orders(None).is_empty());
    }

    #[test]
    fn stop_market_sell_triggers_on_drop() -> Result<()> {
        let mut exchange = create_exchange();
        let order = exchange.place_order(OrderRequest::create_stop_market(
            "BTCUSDT",
            OrderSide::Sell,
            num("1"),
            num("90"),
        ))?;
        assert_eq!(order.status, OrderStatus::New);

        exchange.set_mark_price("BTCUSDT", num("89"))?;
        let order = exchange.get_order(order.order_id)?;
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.average_fill_price, Some(num("89")));
        Ok(())
    }

    #[test]
    fn closing_position_realizes_pnl() -> Result<()> {
        let mut exchange = create_exchange();
        exchange.place_order(OrderRequest::create_market("BTCUSDT", OrderSide::Buy, num("2")))?;
        exchange.set_mark_price("BTCUSDT", num("110"))?;

        let position = &exchange.get_positions(Some("BTCUSDT"))?[0];
        assert_eq!(position.unrealized_pnl, num("20"));

        exchange.place_order(OrderRequest::create_market("BTCUSDT", OrderSide::Sell, num("1")))?;
        assert_eq!(exchange.get_wallet_balance("USDT"), num("1010"));
        let position = &exchange.get_positions(Some("BTCUSDT"))?[0];
        assert_eq!(position.amount, num("1"));
        assert_eq!(position.entry_price, num("100"));

        exchange.place_order(OrderRequest::create_market("BTCUSDT", OrderSide::Sell, num("1")))?;
        assert_eq!(exchange.get_wallet_balance("USDT"), num("1020"));
        let position = &exchange.get_positions(Some("BTCUSDT"))?[0];
        assert!(position.is_flat());
        assert_eq!(position.entry_price, num("0"));
        Ok(())
    }

    #[test]
    fn adding_to_position_averages_entry() -> Result<()> {
        let mut exchange = create_exchange();
        exchange.place_order(OrderRequest::create_market("BTCUSDT", OrderSide::Buy, num("1")))?;
        exchange.set_mark_price("BTCUSDT", num("120"))?;
        exchange.place_order(OrderRequest::create_market("BTCUSDT", OrderSide::Buy, num("3")))?;

        let position = &exchange.get_positions(Some("BTCUSDT"))?[0];
        assert_eq!(position.amount, num("4"));
        assert_eq!(position.entry_price, num("115"));
        Ok(())
    }

    #[test]
    fn flipping_position_resets_entry() -> Result<()> {
        let mut exchange = create_exchange();
        exchange.place_order(OrderRequest::create_market("BTCUSDT", OrderSide::Sell, num("1")))?;
        exchange.set_mark_price("BTCUSDT", num("90"))?;
        exchange.place_order(OrderRequest::create_market("BTCUSDT", OrderSide::Buy, num("3")))?;

        assert_eq!(exchange.get_wallet_balance("USDT"), num("1010"));
        let position = &exchange.get_positions(Some("BTCUSDT"))?[0];
        assert_eq!(position.amount, num("2"));
        assert_eq!(position.entry_price, num("90"));
        Ok(())
    }

    #[test]
    fn cancel_order() -> Result<()> {
        let mut exchange = create_exchange();
        let order = exchange.place_order(OrderRequest::create_limit(
            "BTCUSDT",
            OrderSide::Buy,
            num("1"),
            num("90"),
        ))?;

        let canceled = exchange.cancel_order("BTCUSDT", order.order_id)?;
        assert_eq!(canceled.status, OrderStatus::Canceled);
        assert!(exchange.get_open_orders(Some("BTCUSDT")).is_empty());
        assert_eq!(exchange.get_available_balance("USDT"), num("1000"));

        let err = exchange.cancel_order("BTCUSDT", order.order_id).unwrap_err();
        assert_eq!(api_error(&err), &ApiError::unknown_order());
        Ok(())
    }

    #[test]
    fn cancel_order_wrong_symbol() -> Result<()> {
        let mut exchange = SimulatedExchangeBuilder::new("USDT")
            .set_balance("USDT", num("1000"))
            .set_mark_price("BTCUSDT", num("100"))
            .set_mark_price("ETHUSDT", num("10"))
            .build()?;
        let order = exchange.place_order(OrderRequest::create_limit(
            "BTCUSDT",
            OrderSide::Buy,
            num("1"),
            num("90"),
        ))?;

        let err = exchange.cancel_order("ETHUSDT", order.order_id).unwrap_err();
        assert_eq!(api_error(&err).code, -2011);
        assert_eq!(exchange.get_order(order.order_id)?.status, OrderStatus::New);
        Ok(())
    }

    #[test]
    fn cancel_all_only_touches_symbol() -> Result<()> {
        let mut exchange = SimulatedExchangeBuilder::new("USDT")
            .set_balance("USDT", num("10000"))
            .set_mark_price("BTCUSDT", num("100"))
            .set_mark_price("ETHUSDT", num("10"))
            .build()?;
        for price in ["90", "91", "92"] {
            exchange.place_order(OrderRequest::create_limit(
                "BTCUSDT",
                OrderSide::Buy,
                num("1"),
                num(price),
            ))?;
        }
        exchange.place_order(OrderRequest::create_limit(
            "ETHUSDT",
            OrderSide::Buy,
            num("1"),
            num("9"),
        ))?;

        assert_eq!(exchange.cancel_all_orders("BTCUSDT")?, 3);
        assert!(exchange.get_open_orders(Some("BTCUSDT")).is_empty());
        assert_eq!(exchange.get_open_orders(Some("ETHUSDT")).len(), 1);
        assert_eq!(exchange.get_open_orders(None).len(), 1);
        Ok(())
    }

    #[test]
    fn set_mark_price_unquoted_symbol() {
        let mut exchange = create_exchange();
        let err = exchange.set_mark_price("BTCEUR", num("1")).unwrap_err();
        assert_eq!(err.to_string(), "BTCEUR is not quoted in a margin asset");
    }

    #[test]
    fn leverage_scales_order_margin() -> Result<()> {
        let mut exchange = create_exchange();
        assert_eq!(exchange.leverage(), 10);
        exchange.place_order(OrderRequest::create_limit(
            "BTCUSDT",
            OrderSide::Buy,
            num("5"),
            num("90"),
        ))?;
        // 5 * 90 / 10
        assert_eq!(exchange.get_available_balance("USDT"), num("955"));
        Ok(())
    }

    #[test]
    fn set_leverage_zero() {
        let err = SimulatedExchangeBuilder::new("USDT")
            .set_leverage(0)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Leverage must be at least 1");
    }

    #[test]
    fn build_no_balance() -> Result<()> {
        let exchange = SimulatedExchangeBuilder::new("USDT").build()?;
        let balances = exchange.get_balances();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, "USDT");
        assert_eq!(balances[0].balance, num("0"));
        assert_eq!(balances[0].available_balance, num("0"));
        Ok(())
    }

    #[test]
    fn build_with_margin_assets() -> Result<()> {
        let exchange = SimulatedExchangeBuilder::new("USDT")
            .set_balance("USDT", num("14.1"))
            .set_balance("BUSD", num("5"))
            .build()?;
        let assets: Vec<String> = exchange
            .get_balances()
            .into_iter()
            .map(|balance| balance.asset)
            .collect();
        assert_eq!(assets, vec!["BUSD".to_string(), "USDT".to_string()]);
        assert_eq!(exchange.get_wallet_balance("BUSD"), num("5"));
        assert_eq!(exchange.get_wallet_balance("BTC"), num("0"));
        Ok(())
    }
}
