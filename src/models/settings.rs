use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.us";
pub const DEFAULT_RECV_WINDOW_MS: u64 = 10_000;
pub const DEFAULT_TIME_OFFSET_MS: i64 = 5_000;
pub const DEFAULT_BASE_CURRENCY: &str = "USD";
pub const DEFAULT_OUTPUT_FILE: &str = "result.csv";
pub const API_KEY_SERVICE: &str = "binance.api.key";
pub const API_SECRET_SERVICE: &str = "binance.api.secret";

/// Where credentials are cached between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VaultBackend {
    /// System keychain
    Keyring,
    /// Encrypted file in the vault directory
    File,
}

/// Immutable run configuration, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub base_url: String,
    /// Accepted clock skew for signed requests
    pub recv_window_ms: u64,
    pub time_offset_ms: i64,
    /// Currency every other asset is traded against
    pub base_currency: String,
    pub output_path: PathBuf,
    pub api_key_service: String,
    pub api_secret_service: String,
    pub vault_backend: VaultBackend,
    pub vault_dir: PathBuf,
    /// Treat vault read failures like a missing entry and prompt anyway
    pub vault_error_fallback: bool,
    pub version: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            recv_window_ms: DEFAULT_RECV_WINDOW_MS,
            time_offset_ms: DEFAULT_TIME_OFFSET_MS,
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            api_key_service: API_KEY_SERVICE.to_string(),
            api_secret_service: API_SECRET_SERVICE.to_string(),
            vault_backend: VaultBackend::Keyring,
            vault_dir: default_vault_dir(),
            vault_error_fallback: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// `$HOME/.trade-history-export` (or `%APPDATA%`), else the working directory
pub fn default_vault_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".trade-history-export"))
        .or_else(|| {
            std::env::var_os("APPDATA").map(|dir| PathBuf::from(dir).join("trade-history-export"))
        })
        .unwrap_or_else(|| PathBuf::from("."))
}
