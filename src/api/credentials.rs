use std::fmt;

use keyring::Entry;

use super::error::ApiError;

/// Outcome of a vault lookup
pub enum VaultLookup {
    Found(String),
    NotFound,
    StoreError(String),
}

impl fmt::Debug for VaultLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VaultLookup::Found(_) => f.write_str("Found(<redacted>)"),
            VaultLookup::NotFound => f.write_str("NotFound"),
            VaultLookup::StoreError(reason) => f.debug_tuple("StoreError").field(reason).finish(),
        }
    }
}

/// Secret storage keyed by (service, principal)
pub trait SecretVault {
    /// Backend name used in log lines
    fn backend_name(&self) -> &str;

    fn get(&self, service: &str, principal: &str) -> VaultLookup;

    fn set(&self, service: &str, principal: &str, secret: &str) -> Result<(), ApiError>;
}

/// System keychain vault
///
/// Uses platform-specific secure storage:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service
#[derive(Debug, Default)]
pub struct KeyringVault;

impl KeyringVault {
    pub fn new() -> Self {
        Self
    }
}

impl SecretVault for KeyringVault {
    fn backend_name(&self) -> &str {
        "keyring"
    }

    fn get(&self, service: &str, principal: &str) -> VaultLookup {
        let entry = match Entry::new(service, principal) {
            Ok(entry) => entry,
            Err(e) => {
                return VaultLookup::StoreError(format!("Failed to create keyring entry: {}", e))
            }
        };

        match entry.get_password() {
            Ok(secret) => VaultLookup::Found(secret),
            Err(keyring::Error::NoEntry) => VaultLookup::NotFound,
            Err(e) => VaultLookup::StoreError(format!("Failed to read keyring value: {}", e)),
        }
    }

    fn set(&self, service: &str, principal: &str, secret: &str) -> Result<(), ApiError> {
        let entry = Entry::new(service, principal)?;
        entry.set_password(secret)?;
        Ok(())
    }
}

/// Name of the local OS user, used as the vault principal
pub fn current_principal() -> Option<String> {
    ["USER", "USERNAME", "LOGNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}
