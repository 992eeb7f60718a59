pub mod binance;
pub mod client;
pub mod credentials;
pub mod error;
pub mod rate_limiter;
pub mod secret_store;
pub mod secure_storage;

#[cfg(test)]
pub(crate) mod fixture;

pub use client::{Account, Balance, ExchangeSession, RateLimitConfig, Trade};
pub use credentials::{current_principal, KeyringVault, SecretVault, VaultLookup};
pub use error::ApiError;
pub use rate_limiter::RateLimiter;
pub use secret_store::{SecretError, SecretStore};
pub use secure_storage::EncryptedFileVault;
