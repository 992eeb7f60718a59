use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ApiError;

/// Configuration for rate limiting
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Request weight replenished per second
    pub weight_per_second: u32,
    pub burst_size: u32,
}

/// One asset held by the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    /// Decimal string as returned by the exchange (e.g. "0.50000000")
    pub free: String,
    pub locked: String,
}

/// Account snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    pub balances: Vec<Balance>,
}

/// A single executed trade for one trading pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
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
    /// Unix milliseconds
    pub time: i64,
}

/// Authenticated exchange session the export pipeline runs against.
///
/// Every call is awaited to completion before the next one is issued; the
/// pipeline never drives two requests at once.
#[async_trait]
pub trait ExchangeSession: Send + Sync {
    /// Get the exchange name (e.g., "binance.us")
    fn exchange_name(&self) -> &str;

    /// Server clock in Unix milliseconds
    async fn server_time(&self) -> Result<i64, ApiError>;

    /// Fetch the account balances
    async fn get_account(&self, recv_window_ms: u64) -> Result<Account, ApiError>;

    /// Fetch every trade for one trading pair, oldest first
    async fn list_trades(&self, symbol: &str, recv_window_ms: u64) -> Result<Vec<Trade>, ApiError>;
}
