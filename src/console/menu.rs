// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Error, format_err};
use std::str::FromStr;

pub const BANNER: &str = "
╔════════════════════════════════════════════════════════════════╗
║                                                                ║
║            BINANCE FUTURES ORDER CONSOLE (TESTNET)             ║
║                                                                ║
╚════════════════════════════════════════════════════════════════╝
";

pub const MENU: &str = "
╔════════════════════════════════════════════════════════════════╗
║                           MAIN MENU                            ║
╠════════════════════════════════════════════════════════════════╣
║  1  View Account Balance                                       ║
║  2  Check Current Price                                        ║
║  3  Place Market Order (BUY/SELL)                              ║
║  4  Place Limit Order (BUY/SELL)                               ║
║  5  Place Stop-Limit Order                                     ║
║  6  View Open Orders                                           ║
║  7  View Active Positions                                      ║
║  8  Cancel Order                                               ║
║  9  Cancel All Orders                                          ║
║  0  Exit                                                       ║
╚════════════════════════════════════════════════════════════════╝
";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuChoice {
    Exit,
    ViewBalance,
    CheckPrice,
    PlaceMarketOrder,
    PlaceLimitOrder,
    PlaceStopLimitOrder,
    ViewOpenOrders,
    ViewPositions,
    CancelOrder,
    CancelAllOrders,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 10] = [
        MenuChoice::Exit,
        MenuChoice::ViewBalance,
        MenuChoice::CheckPrice,
        MenuChoice::PlaceMarketOrder,
        MenuChoice::PlaceLimitOrder,
        MenuChoice::PlaceStopLimitOrder,
        MenuChoice::ViewOpenOrders,
        MenuChoice::ViewPositions,
        MenuChoice::CancelOrder,
        MenuChoice::CancelAllOrders,
    ];

    pub fn digit(&self) -> char {
        match self {
            MenuChoice::Exit => '0',
            MenuChoice::ViewBalance => '1',
            MenuChoice::CheckPrice => '2',
            MenuChoice::PlaceMarketOrder => '3',
            MenuChoice::PlaceLimitOrder => '4',
            MenuChoice::PlaceStopLimitOrder => '5',
            MenuChoice::ViewOpenOrders => '6',
            MenuChoice::ViewPositions => '7',
            MenuChoice::CancelOrder => '8',
            MenuChoice::CancelAllOrders => '9',
        }
    }
}

impl FromStr for MenuChoice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        MenuChoice::ALL
            .into_iter()
            .find(|choice| s.len() == 1 && s.starts_with(choice.digit()))
            .ok_or(format_err!("Invalid choice. Please select 0-9."))
    }
}
