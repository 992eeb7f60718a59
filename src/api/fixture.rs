use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{Account, Balance, ExchangeSession, Trade};
use super::error::ApiError;

/// Deterministic in-memory exchange for pipeline tests
#[derive(Default)]
pub struct FixtureSession {
    pub server_time: Option<i64>,
    pub balances: Vec<Balance>,
    pub account_error: Option<String>,
    pub trades: HashMap<String, Vec<Trade>>,
    pub failing_symbols: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FixtureSession {
    pub fn with_balance(mut self, asset: &str, free: &str) -> Self {
        self.balances.push(Balance {
            asset: asset.to_string(),
            free: free.to_string(),
            locked: "0".to_string(),
        });
        self
    }

    pub fn with_trades(mut self, symbol: &str, trades: Vec<Trade>) -> Self {
        self.trades.insert(symbol.to_string(), trades);
        self
    }

    pub fn failing(mut self, symbol: &str) -> Self {
        self.failing_symbols.push(symbol.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

pub fn trade(symbol: &str, id: i64, time: i64) -> Trade {
    Trade {
        commission: "0.00100000".to_string(),
        commission_asset: "USD".to_string(),
        price: "100.00".to_string(),
        quantity: "1.5".to_string(),
        quote_quantity: "150.00".to_string(),
        symbol: symbol.to_string(),
        id,
        is_best_match: true,
        is_buyer: id % 2 == 1,
        is_isolated: false,
        is_maker: false,
        order_id: id * 10,
        time,
    }
}

#[async_trait]
impl ExchangeSession for FixtureSession {
    fn exchange_name(&self) -> &str {
        "fixture"
    }

    async fn server_time(&self) -> Result<i64, ApiError> {
        self.record("server_time".to_string());
        self.server_time
            .ok_or_else(|| ApiError::HttpStatus { status: 503, body: "unavailable".to_string() })
    }

    async fn get_account(&self, recv_window_ms: u64) -> Result<Account, ApiError> {
        self.record(format!("get_account({})", recv_window_ms));
        if let Some(message) = &self.account_error {
            return Err(ApiError::AuthenticationError(message.clone()));
        }
        Ok(Account {
            balances: self.balances.clone(),
        })
    }

    async fn list_trades(&self, symbol: &str, recv_window_ms: u64) -> Result<Vec<Trade>, ApiError> {
        self.record(format!("list_trades({}, {})", symbol, recv_window_ms));
        if self.failing_symbols.iter().any(|s| s == symbol) {
            return Err(ApiError::ExchangeError {
                code: -1121,
                message: "Invalid symbol.".to_string(),
            });
        }
        Ok(self.trades.get(symbol).cloned().unwrap_or_default())
    }
}
