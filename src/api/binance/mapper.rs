use super::types::{BinanceAccount, BinanceBalance, BinanceTrade};
use crate::api::client::{Account, Balance, Trade};

pub fn map_balance(balance: BinanceBalance) -> Balance {
    Balance {
        asset: balance.asset,
        free: balance.free,
        locked: balance.locked,
    }
}

/// Keeps the exchange's balance order
pub fn map_account(account: BinanceAccount) -> Account {
    Account {
        balances: account.balances.into_iter().map(map_balance).collect(),
    }
}

pub fn map_trade(trade: BinanceTrade) -> Trade {
    Trade {
        commission: trade.commission,
        commission_asset: trade.commission_asset,
        price: trade.price,
        quantity: trade.qty,
        quote_quantity: trade.quote_qty,
        symbol: trade.symbol,
        id: trade.id,
        is_best_match: trade.is_best_match,
        is_buyer: trade.is_buyer,
        is_isolated: trade.is_isolated,
        is_maker: trade.is_maker,
        order_id: trade.order_id,
        time: trade.time,
    }
}
