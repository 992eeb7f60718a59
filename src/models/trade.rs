use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::client::Trade;

/// Header of the export file, in column order
pub const EXPORT_COLUMNS: [&str; 13] = [
    "Commission",
    "CommissionAsset",
    "Price",
    "Quantity",
    "QuoteQuantity",
    "Symbol",
    "ID",
    "IsBestMatch",
    "IsBuyer",
    "IsIsolated",
    "IsMaker",
    "OrderID",
    "Time",
];

/// One CSV row. Field order must match `EXPORT_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub commission: String,
    pub commission_asset: String,
    pub price: String,
    pub quantity: String,
    pub quote_quantity: String,
    pub symbol: String,
    pub id: i64,
    pub is_best_match: bool,
    pub is_buyer: bool,
    pub is_isolated: bool,
    pub is_maker: bool,
    pub order_id: i64,
    pub time: String,
}

impl From<&Trade> for ExportRow {
    fn from(trade: &Trade) -> Self {
        Self {
            commission: trade.commission.clone(),
            commission_asset: trade.commission_asset.clone(),
            price: trade.price.clone(),
            quantity: trade.quantity.clone(),
            quote_quantity: trade.quote_quantity.clone(),
            symbol: trade.symbol.clone(),
            id: trade.id,
            is_best_match: trade.is_best_match,
            is_buyer: trade.is_buyer,
            is_isolated: trade.is_isolated,
            is_maker: trade.is_maker,
            order_id: trade.order_id,
            time: format_trade_time(trade.time),
        }
    }
}

/// Render epoch milliseconds as `2021-01-01 00:00:00 +0000 UTC`.
///
/// Fractional seconds are only printed when non-zero, without trailing
/// zeros (`.1`, not `.100`). Out-of-range values fall back to the raw
/// millisecond count.
pub fn format_trade_time(millis: i64) -> String {
    let Some(time) = DateTime::<Utc>::from_timestamp_millis(millis) else {
        return millis.to_string();
    };

    let fraction = match time.timestamp_subsec_millis() {
        0 => String::new(),
        ms => format!(".{:03}", ms).trim_end_matches('0').to_string(),
    };
    format!("{}{} +0000 UTC", time.format("%Y-%m-%d %H:%M:%S"), fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade() -> Trade {
        Trade {
            commission: "0.00001000".to_string(),
            commission_asset: "BTC".to_string(),
            price: "29000.00".to_string(),
            quantity: "0.01".to_string(),
            quote_quantity: "290.00".to_string(),
            symbol: "BTCUSD".to_string(),
            id: 1,
            is_best_match: true,
            is_buyer: true,
            is_isolated: false,
            is_maker: false,
            order_id: 42,
            time: 1609459200000,
        }
    }

    #[test]
    fn test_format_new_year_2021() {
        assert_eq!(format_trade_time(1609459200000), "2021-01-01 00:00:00 +0000 UTC");
    }

    #[test]
    fn test_format_keeps_milliseconds() {
        assert_eq!(format_trade_time(1609459200123), "2021-01-01 00:00:00.123 +0000 UTC");
    }

    #[test]
    fn test_format_trims_trailing_fraction_zeros() {
        assert_eq!(format_trade_time(1609459200100), "2021-01-01 00:00:00.1 +0000 UTC");
        assert_eq!(format_trade_time(1609459200120), "2021-01-01 00:00:00.12 +0000 UTC");
        assert_eq!(format_trade_time(1609459200007), "2021-01-01 00:00:00.007 +0000 UTC");
    }

    #[test]
    fn test_format_out_of_range_falls_back() {
        assert_eq!(format_trade_time(i64::MAX), i64::MAX.to_string());
    }

    #[test]
    fn test_row_projection() {
        let row = ExportRow::from(&trade());

        assert_eq!(row.id, 1);
        assert_eq!(row.order_id, 42);
        assert!(row.is_buyer);
        assert_eq!(row.symbol, "BTCUSD");
        assert_eq!(row.time, "2021-01-01 00:00:00 +0000 UTC");
    }
}
