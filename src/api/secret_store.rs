use std::io::{self, BufRead, Write};

use thiserror::Error;

use super::credentials::{SecretVault, VaultLookup};
use super::error::ApiError;
use crate::models::Credential;

#[derive(Error, Debug)]
pub enum SecretError {
    #[error("Failed to open {backend} vault: {error}")]
    VaultOpen { backend: String, error: ApiError },

    #[error("Failed to read '{service}' for {principal} from the vault: {reason}")]
    VaultRead {
        service: String,
        principal: String,
        reason: String,
    },

    #[error("Failed to set vault value for '{service}': {error}")]
    VaultWrite { service: String, error: ApiError },

    #[error("Prompt failed: {0}")]
    Prompt(#[from] io::Error),

    #[error("No value entered for '{service}'")]
    EmptyInput { service: String },
}

/// Vault-backed secret lookup with an interactive first-use prompt
pub struct SecretStore {
    vault: Box<dyn SecretVault>,
    prompt_on_store_error: bool,
}

impl SecretStore {
    pub fn new(vault: Box<dyn SecretVault>, prompt_on_store_error: bool) -> Self {
        Self {
            vault,
            prompt_on_store_error,
        }
    }

    /// Fetch a secret, prompting on stdin/stdout when the vault has none
    pub fn get_secret(&self, service: &str, principal: &str) -> Result<Credential, SecretError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.get_secret_with(service, principal, &mut stdin.lock(), &mut stdout.lock())
    }

    /// Vault read, then prompt + vault write on a miss.
    ///
    /// A value entered at the prompt is only returned once the vault write
    /// succeeded.
    pub fn get_secret_with<R: BufRead, W: Write>(
        &self,
        service: &str,
        principal: &str,
        input: &mut R,
        output: &mut W,
    ) -> Result<Credential, SecretError> {
        match self.vault.get(service, principal) {
            VaultLookup::Found(secret) => {
                log::debug!(
                    "Using '{}' for {} from {} vault",
                    service,
                    principal,
                    self.vault.backend_name()
                );
                return Ok(Credential::new(service, principal, secret));
            }
            VaultLookup::NotFound => {
                log::info!("'{}' for {} not found in {} vault", service, principal, self.vault.backend_name());
            }
            VaultLookup::StoreError(reason) if self.prompt_on_store_error => {
                log::warn!(
                    "Vault read for '{}' failed, prompting instead: {}",
                    service,
                    reason
                );
            }
            VaultLookup::StoreError(reason) => {
                return Err(SecretError::VaultRead {
                    service: service.to_string(),
                    principal: principal.to_string(),
                    reason,
                });
            }
        }

        let secret = read_value(&format!("New '{}' for {}", service, principal), input, output)?
            .ok_or_else(|| SecretError::EmptyInput {
                service: service.to_string(),
            })?;

        self.vault
            .set(service, principal, &secret)
            .map_err(|error| SecretError::VaultWrite {
                service: service.to_string(),
                error,
            })?;

        Ok(Credential::new(service, principal, secret))
    }
}

/// Print `<message>: ` and read one line. `None` on EOF or a blank line.
fn read_value<R: BufRead, W: Write>(
    message: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<String>> {
    write!(output, "{}: ", message)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let value = line.trim_end_matches(&['\r', '\n'][..]);
    if value.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(value.to_string()))
    }
}
