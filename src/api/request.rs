// SPDX-License-Identifier: GPL-3.0-or-later

use crate::api::common::{OrderSide, OrderType};
use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    pub type_: OrderType,
    pub quantity: BigDecimal,
    pub price: Option<BigDecimal>,
    pub stop_price: Option<BigDecimal>,
    pub client_order_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("Symbol must not be empty")]
    EmptySymbol,
    #[error("Quantity must be greater than 0")]
    NonPositiveQuantity,
    #[error("{0} orders require a valid price")]
    MissingPrice(OrderType),
    #[error("{0} orders require a valid stop price")]
    MissingStopPrice(OrderType),
    #[error(
        "For BUY stop orders, stop price ({stop_price}) must be above current market price ({market_price}). Stop orders trigger when price rises to your stop price."
    )]
    BuyStopNotAboveMarket {
        stop_price: BigDecimal,
        market_price: BigDecimal,
    },
    #[error(
        "For SELL stop orders, stop price ({stop_price}) must be below current market price ({market_price}). Stop orders trigger when price falls to your stop price."
    )]
    SellStopNotBelowMarket {
        stop_price: BigDecimal,
        market_price: BigDecimal,
    },
    #[error(
        "For BUY STOP_LIMIT, limit price ({price}) should be <= stop price ({stop_price}). Limit price is where you want to buy after stop triggers."
    )]
    BuyLimitAboveStop {
        price: BigDecimal,
        stop_price: BigDecimal,
    },
    #[error(
        "For SELL STOP_LIMIT, limit price ({price}) should be >= stop price ({stop_price}). Limit price is where you want to sell after stop triggers."
    )]
    SellLimitBelowStop {
        price: BigDecimal,
        stop_price: BigDecimal,
    },
}

impl OrderRequest {
    fn new(
        symbol: &str,
        side: OrderSide,
        type_: OrderType,
        quantity: BigDecimal,
        price: Option<BigDecimal>,
        stop_price: Option<BigDecimal>,
    ) -> Self {
        OrderRequest {
            symbol: symbol.trim().to_ascii_uppercase(),
            side,
            type_,
            quantity,
            price,
            stop_price,
            client_order_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn create_market(symbol: &str, side: OrderSide, quantity: BigDecimal) -> Self {
        Self::new(symbol, side, OrderType::Market, quantity, None, None)
    }

    pub fn create_limit(
        symbol: &str,
        side: OrderSide,
        quantity: BigDecimal,
        price: BigDecimal,
    ) -> Self {
        Self::new(symbol, side, OrderType::Limit, quantity, Some(price), None)
    }

    pub fn create_stop_limit(
        symbol: &str,
        side: OrderSide,
        quantity: BigDecimal,
        stop_price: BigDecimal,
        price: BigDecimal,
    ) -> Self {
        Self::new(
            symbol,
            side,
            OrderType::StopLimit,
            quantity,
            Some(price),
            Some(stop_price),
        )
    }

    pub fn create_stop_market(
        symbol: &str,
        side: OrderSide,
        quantity: BigDecimal,
        stop_price: BigDecimal,
    ) -> Self {
        Self::new(
            symbol,
            side,
            OrderType::StopMarket,
            quantity,
            None,
            Some(stop_price),
        )
    }

    /// Builds a request of any type, as when the type itself comes from user input.
    pub fn create(
        symbol: &str,
        side: OrderSide,
        type_: OrderType,
        quantity: BigDecimal,
        price: Option<BigDecimal>,
        stop_price: Option<BigDecimal>,
    ) -> Self {
        Self::new(symbol, side, type_, quantity, price, stop_price)
    }

    /// Checks the request is well-formed before it is submitted.
    ///
    /// `market_price` is the current price of the symbol, if it could be fetched. When present,
    /// stop orders are also checked against it so that they would not trigger immediately.
    pub fn validate(&self, market_price: Option<&BigDecimal>) -> Result<(), OrderValidationError> {
        let zero = BigDecimal::from(0);

        if self.symbol.is_empty() {
            return Err(OrderValidationError::EmptySymbol);
        }
        if self.quantity <= zero {
            return Err(OrderValidationError::NonPositiveQuantity);
        }

        let price = match &self.price {
            Some(price) if *price > zero => Some(price),
            _ if self.type_.requires_price() => {
                return Err(OrderValidationError::MissingPrice(self.type_.clone()));
            }
            _ => None,
        };

        if !self.type_.requires_stop_price() {
            return Ok(());
        }

        let stop_price = match &self.stop_price {
            Some(stop_price) if *stop_price > zero => stop_price,
            _ => return Err(OrderValidationError::MissingStopPrice(self.type_.clone())),
        };

        let Some(market_price) = market_price else {
            return Ok(());
        };

        match self.side {
            OrderSide::Buy => {
                if stop_price <= market_price {
                    return Err(OrderValidationError::BuyStopNotAboveMarket {
                        stop_price: stop_price.clone(),
                        market_price: market_price.clone(),
                    });
                }
                if let Some(price) = price.filter(|price| *price > stop_price) {
                    return Err(OrderValidationError::BuyLimitAboveStop {
                        price: price.clone(),
                        stop_price: stop_price.clone(),
                    });
                }
            }
            OrderSide::Sell => {
                if stop_price >= market_price {
                    return Err(OrderValidationError::SellStopNotBelowMarket {
                        stop_price: stop_price.clone(),
                        market_price: market_price.clone(),
                    });
                }
                if let Some(price) = price.filter(|price| *price < stop_price) {
                    return Err(OrderValidationError::SellLimitBelowStop {
                        price: price.clone(),
                        stop_price: stop_price.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
