use serde::{Deserialize, Serialize};

/// `GET /api/v3/time`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceServerTime {
    pub server_time: i64,
}

/// Error body returned alongside non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinanceErrorResponse {
    pub code: i64,
    pub msg: String,
}

/// `GET /api/v3/account`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceAccount {
    #[serde(default)]
    pub can_trade: bool,
    #[serde(default)]
    pub account_type: Option<String>,
    pub balances: Vec<BinanceBalance>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinanceBalance {
    pub asset: String,
    pub free: String,
    pub locked: String,
}

/// One entry of `GET /api/v3/myTrades`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTrade {
    pub symbol: String,
    pub id: i64,
    pub order_id: i64,
    pub price: String,
    pub qty: String,
    pub quote_qty: String,
    pub commission: String,
    pub commission_asset: String,
    /// Unix milliseconds
    pub time: i64,
    pub is_buyer: bool,
    pub is_maker: bool,
    pub is_best_match: bool,
    /// Only present on margin accounts
    #[serde(default)]
    pub is_isolated: bool,
}
