pub mod api;
pub mod export;
pub mod models;

use std::io;

use api::{
    binance::BinanceClient, current_principal, EncryptedFileVault, KeyringVault, SecretError,
    SecretStore, SecretVault,
};
use export::{run_export, ExportError, ExportSummary};
use models::{ExportConfig, VaultBackend};

/// Run one full export: identity, credentials, session, trades to CSV.
pub async fn run(config: &ExportConfig) -> Result<ExportSummary, ExportError> {
    log::info!("trade-history-export v{}", config.version);

    let principal = current_principal().ok_or(ExportError::Identity)?;
    println!("using username: {}", principal);

    let (api_key, api_secret) = {
        let store = SecretStore::new(open_vault(config)?, config.vault_error_fallback);
        (
            store.get_secret(&config.api_key_service, &principal)?,
            store.get_secret(&config.api_secret_service, &principal)?,
        )
    };
    log::info!("Using API key {}", api_key.preview());

    let session = BinanceClient::new(api_key.secret, api_secret.secret, config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_export(&session, config, &mut out).await
}

/// Vault selected by the configuration
pub fn open_vault(config: &ExportConfig) -> Result<Box<dyn SecretVault>, SecretError> {
    match config.vault_backend {
        VaultBackend::Keyring => Ok(Box::new(KeyringVault::new())),
        VaultBackend::File => {
            let vault = EncryptedFileVault::open(&config.vault_dir).map_err(|error| {
                SecretError::VaultOpen {
                    backend: "encrypted-file".to_string(),
                    error,
                }
            })?;
            Ok(Box::new(vault))
        }
    }
}
