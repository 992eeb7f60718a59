use std::fmt;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use sha2::Sha256;

use crate::api::{
    client::{Account, ExchangeSession, RateLimitConfig, Trade},
    error::ApiError,
    rate_limiter::RateLimiter,
};
use crate::models::{Credential, ExportConfig};

use super::{
    mapper::{map_account, map_trade},
    types::{BinanceAccount, BinanceErrorResponse, BinanceServerTime, BinanceTrade},
};

type HmacSha256 = Hmac<Sha256>;

const SERVER_TIME_ENDPOINT: &str = "/api/v3/time";
const ACCOUNT_ENDPOINT: &str = "/api/v3/account";
const MY_TRADES_ENDPOINT: &str = "/api/v3/myTrades";

/// Max page size accepted by `myTrades`
const TRADES_PAGE_LIMIT: usize = 1000;

// Request weights from the Binance.US REST docs
const ACCOUNT_WEIGHT: u32 = 10;
const MY_TRADES_WEIGHT: u32 = 10;
const SERVER_TIME_WEIGHT: u32 = 1;

pub struct BinanceClient {
    api_key: String,
    api_secret: String,
    base_url: String,
    time_offset_ms: i64,
    http_client: reqwest::Client,
    rate_limiter: RateLimiter,
}

impl fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinanceClient")
            .field("api_key", &Credential::create_preview(&self.api_key))
            .field("base_url", &self.base_url)
            .field("time_offset_ms", &self.time_offset_ms)
            .finish_non_exhaustive()
    }
}

impl BinanceClient {
    pub fn new(api_key: String, api_secret: String, config: &ExportConfig) -> Self {
        // Binance.US: 1200 weight per minute
        let rate_limiter = RateLimiter::new(RateLimitConfig {
            weight_per_second: 20,
            burst_size: 40,
        });

        Self {
            api_key,
            api_secret,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            time_offset_ms: config.time_offset_ms,
            http_client: reqwest::Client::new(),
            rate_limiter,
        }
    }

    /// Request timestamp, shifted back by the configured offset to absorb a
    /// local clock running ahead of the server.
    fn timestamp_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis() - self.time_offset_ms
    }

    /// HMAC-SHA256 over the query string, hex encoded
    fn sign(&self, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    fn build_query(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    async fn public_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        weight: u32,
    ) -> Result<T, ApiError> {
        self.rate_limiter.acquire(weight).await?;

        let url = format!("{}{}", self.base_url, endpoint);
        log::debug!("GET {}", url);

        let response = self.http_client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    async fn signed_get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        recv_window_ms: u64,
        weight: u32,
    ) -> Result<T, ApiError> {
        self.rate_limiter.acquire(weight).await?;

        let mut all_params = params.to_vec();
        all_params.push(("recvWindow", recv_window_ms.to_string()));
        all_params.push(("timestamp", self.timestamp_ms().to_string()));

        let query = Self::build_query(&all_params);
        let signature = self.sign(&query);
        let url = format!("{}{}?{}&signature={}", self.base_url, endpoint, query, signature);

        log::debug!("GET (signed) {}", endpoint);

        let response = self
            .http_client
            .get(&url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|e| {
                ApiError::ParseError(format!("Failed to parse response: {} - Body: {}", e, body))
            });
        }

        Err(Self::status_error(status.as_u16(), body))
    }

    fn status_error(status: u16, body: String) -> ApiError {
        let detail = serde_json::from_str::<BinanceErrorResponse>(&body).ok();

        match (status, detail) {
            (401 | 403, detail) => ApiError::AuthenticationError(
                detail
                    .map(|d| d.msg)
                    .unwrap_or_else(|| "Invalid API credentials or permissions".to_string()),
            ),
            (418 | 429, _) => ApiError::RateLimitError(
                "Request weight limit exceeded. Please wait before retrying.".to_string(),
            ),
            (_, Some(detail)) => ApiError::ExchangeError {
                code: detail.code,
                message: detail.msg,
            },
            (_, None) => ApiError::HttpStatus { status, body },
        }
    }
}

#[async_trait]
impl ExchangeSession for BinanceClient {
    fn exchange_name(&self) -> &str {
        "binance.us"
    }

    async fn server_time(&self) -> Result<i64, ApiError> {
        let time: BinanceServerTime = self
            .public_get(SERVER_TIME_ENDPOINT, SERVER_TIME_WEIGHT)
            .await?;
        Ok(time.server_time)
    }

    async fn get_account(&self, recv_window_ms: u64) -> Result<Account, ApiError> {
        let account: BinanceAccount = self
            .signed_get(ACCOUNT_ENDPOINT, &[], recv_window_ms, ACCOUNT_WEIGHT)
            .await?;
        Ok(map_account(account))
    }

    async fn list_trades(&self, symbol: &str, recv_window_ms: u64) -> Result<Vec<Trade>, ApiError> {
        let mut trades = Vec::new();
        let mut from_id: i64 = 0;

        loop {
            let params = [
                ("symbol", symbol.to_string()),
                ("fromId", from_id.to_string()),
                ("limit", TRADES_PAGE_LIMIT.to_string()),
            ];

            let page: Vec<BinanceTrade> = self
                .signed_get(MY_TRADES_ENDPOINT, &params, recv_window_ms, MY_TRADES_WEIGHT)
                .await?;

            let page_len = page.len();
            let last_id = page.last().map(|t| t.id);
            trades.extend(page.into_iter().map(map_trade));

            match last_id {
                Some(id) if page_len >= TRADES_PAGE_LIMIT => from_id = id + 1,
                _ => break,
            }
        }

        log::debug!("Fetched {} trades for {}", trades.len(), symbol);
        Ok(trades)
    }
}
