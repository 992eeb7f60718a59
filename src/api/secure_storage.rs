use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::Argon2;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::credentials::{SecretVault, VaultLookup};
use super::error::ApiError;

const ENCRYPTION_VERSION: u8 = 1;
const STORE_FILE_NAME: &str = "credentials.enc";

#[derive(Serialize, Deserialize, Clone)]
struct EncryptedCredential {
    nonce: String,      // Base64 encoded nonce
    ciphertext: String, // Base64 encoded encrypted data
}

#[derive(Serialize, Deserialize)]
struct CredentialStore {
    version: u8,
    salt: String, // Base64 encoded salt for key derivation
    credentials: HashMap<String, EncryptedCredential>,
}

/// Machine-bound encrypted credential file, for hosts without a usable
/// system keychain.
pub struct EncryptedFileVault {
    store_path: PathBuf,
    master_key: Vec<u8>,
}

impl EncryptedFileVault {
    /// Open (or prepare) the store inside `vault_dir`
    pub fn open(vault_dir: &Path) -> Result<Self, ApiError> {
        let store_path = vault_dir.join(STORE_FILE_NAME);

        // Load or create store to get/generate persistent salt
        let store = Self::load_or_create_store(&store_path)?;
        if store.version != ENCRYPTION_VERSION {
            return Err(ApiError::EncryptionError(format!(
                "Unsupported store version {}",
                store.version
            )));
        }

        let master_key = Self::derive_key(&Self::get_machine_id(), &store.salt)?;

        // Persist a fresh store right away so the salt is stable across runs
        let vault = Self {
            store_path,
            master_key,
        };
        if !vault.store_path.exists() {
            vault.save_store(&store)?;
        }

        Ok(vault)
    }

    fn load_or_create_store(store_path: &Path) -> Result<CredentialStore, ApiError> {
        if store_path.exists() {
            let data = fs::read(store_path)
                .map_err(|e| ApiError::EncryptionError(format!("Failed to read store: {}", e)))?;

            serde_json::from_slice(&data)
                .map_err(|e| ApiError::EncryptionError(format!("Failed to parse store: {}", e)))
        } else {
            let mut salt_bytes = [0u8; 16];
            OsRng.fill_bytes(&mut salt_bytes);

            Ok(CredentialStore {
                version: ENCRYPTION_VERSION,
                salt: BASE64.encode(salt_bytes),
                credentials: HashMap::new(),
            })
        }
    }

    fn get_machine_id() -> String {
        let hostname = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string());

        let username = super::credentials::current_principal()
            .unwrap_or_else(|| "unknown-user".to_string());

        format!("trade-history-export-{}-{}", hostname, username)
    }

    fn derive_key(machine_id: &str, salt_b64: &str) -> Result<Vec<u8>, ApiError> {
        use argon2::{Algorithm, Params, Version};

        let salt_bytes = BASE64
            .decode(salt_b64)
            .map_err(|e| ApiError::EncryptionError(format!("Invalid salt: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default());

        let mut output_key = [0u8; 32]; // AES-256
        argon2
            .hash_password_into(machine_id.as_bytes(), &salt_bytes, &mut output_key)
            .map_err(|e| ApiError::EncryptionError(format!("Key derivation failed: {}", e)))?;

        Ok(output_key.to_vec())
    }

    fn entry_key(service: &str, principal: &str) -> String {
        format!("{}/{}", service, principal)
    }

    fn load_store(&self) -> Result<CredentialStore, ApiError> {
        Self::load_or_create_store(&self.store_path)
    }

    fn save_store(&self, store: &CredentialStore) -> Result<(), ApiError> {
        let data = serde_json::to_vec_pretty(store)
            .map_err(|e| ApiError::EncryptionError(format!("Failed to serialize store: {}", e)))?;

        if let Some(parent) = self.store_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ApiError::EncryptionError(format!("Failed to create directory: {}", e)))?;
        }

        fs::write(&self.store_path, data)
            .map_err(|e| ApiError::EncryptionError(format!("Failed to write store: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.store_path, fs::Permissions::from_mode(0o600))
                .map_err(|e| ApiError::EncryptionError(format!("Failed to restrict store: {}", e)))?;
        }

        Ok(())
    }

    fn cipher(&self) -> Result<Aes256Gcm, ApiError> {
        Aes256Gcm::new_from_slice(&self.master_key)
            .map_err(|e| ApiError::EncryptionError(format!("Failed to create cipher: {}", e)))
    }

    fn decrypt(&self, encrypted: &EncryptedCredential) -> Result<String, ApiError> {
        let nonce_bytes = BASE64
            .decode(&encrypted.nonce)
            .map_err(|e| ApiError::EncryptionError(format!("Invalid nonce: {}", e)))?;
        if nonce_bytes.len() != 12 {
            return Err(ApiError::EncryptionError("Invalid nonce length".to_string()));
        }

        let ciphertext = BASE64
            .decode(&encrypted.ciphertext)
            .map_err(|e| ApiError::EncryptionError(format!("Invalid ciphertext: {}", e)))?;

        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(&nonce_bytes), ciphertext.as_ref())?;

        String::from_utf8(plaintext)
            .map_err(|e| ApiError::EncryptionError(format!("Invalid UTF-8: {}", e)))
    }
}

impl SecretVault for EncryptedFileVault {
    fn backend_name(&self) -> &str {
        "encrypted-file"
    }

    fn get(&self, service: &str, principal: &str) -> VaultLookup {
        let store = match self.load_store() {
            Ok(store) => store,
            Err(e) => return VaultLookup::StoreError(e.to_string()),
        };

        match store.credentials.get(&Self::entry_key(service, principal)) {
            None => VaultLookup::NotFound,
            Some(encrypted) => match self.decrypt(encrypted) {
                Ok(secret) => VaultLookup::Found(secret),
                Err(e) => VaultLookup::StoreError(e.to_string()),
            },
        }
    }

    fn set(&self, service: &str, principal: &str, secret: &str) -> Result<(), ApiError> {
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher()?
            .encrypt(Nonce::from_slice(&nonce_bytes), secret.as_bytes())?;

        let mut store = self.load_store()?;
        store.credentials.insert(
            Self::entry_key(service, principal),
            EncryptedCredential {
                nonce: BASE64.encode(nonce_bytes),
                ciphertext: BASE64.encode(&ciphertext),
            },
        );

        self.save_store(&store)?;
        log::info!("Credential '{}' for {} stored and encrypted", service, principal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let vault = EncryptedFileVault::open(dir.path()).unwrap();

        vault.set("binance.api.key", "alice", "my-secret-value-123").unwrap();

        match vault.get("binance.api.key", "alice") {
            VaultLookup::Found(secret) => assert_eq!(secret, "my-secret-value-123"),
            other => panic!("unexpected lookup: {:?}", other),
        }
    }

    #[test]
    fn test_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let vault = EncryptedFileVault::open(dir.path()).unwrap();

        assert!(matches!(vault.get("binance.api.key", "nobody"), VaultLookup::NotFound));
    }

    #[test]
    fn test_entries_are_scoped_by_principal() {
        let dir = tempfile::tempdir().unwrap();
        let vault = EncryptedFileVault::open(dir.path()).unwrap();

        vault.set("binance.api.secret", "alice", "a").unwrap();

        assert!(matches!(vault.get("binance.api.secret", "bob"), VaultLookup::NotFound));
    }

    #[test]
    fn test_reopen_keeps_salt_and_secrets() {
        let dir = tempfile::tempdir().unwrap();
        EncryptedFileVault::open(dir.path())
            .unwrap()
            .set("binance.api.key", "alice", "persisted")
            .unwrap();

        let reopened = EncryptedFileVault::open(dir.path()).unwrap();
        assert!(matches!(
            reopened.get("binance.api.key", "alice"),
            VaultLookup::Found(ref s) if s == "persisted"
        ));
    }

    #[test]
    fn test_secret_not_stored_in_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let vault = EncryptedFileVault::open(dir.path()).unwrap();

        vault.set("binance.api.key", "alice", "plaintext-marker").unwrap();

        let raw = fs::read_to_string(dir.path().join(STORE_FILE_NAME)).unwrap();
        assert!(!raw.contains("plaintext-marker"));
    }

    #[test]
    fn test_tampered_ciphertext_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let vault = EncryptedFileVault::open(dir.path()).unwrap();
        vault.set("binance.api.key", "alice", "value").unwrap();

        let path = dir.path().join(STORE_FILE_NAME);
        let mut store: CredentialStore =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        if let Some(entry) = store.credentials.get_mut("binance.api.key/alice") {
            entry.ciphertext = BASE64.encode(b"garbage-bytes-garbage");
        }
        fs::write(&path, serde_json::to_vec(&store).unwrap()).unwrap();

        assert!(matches!(
            vault.get("binance.api.key", "alice"),
            VaultLookup::StoreError(_)
        ));
    }
}
