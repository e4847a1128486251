//! Credential-store seam for provider API keys.
//!
//! Keys are filed under service [`SERVICE`] with account `provider-<name>`.
//! When no backend is available the key stays in `providers.json`.

use tracing::debug;

pub const SERVICE: &str = "byok-cli";
const ACCOUNT_PREFIX: &str = "provider-";

#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("credential store unavailable")]
    Unavailable,
    #[error("credential store error: {0}")]
    Backend(String),
}

pub trait SecretStore: Send + Sync {
    fn is_available(&self) -> bool;
    fn store(&self, account: &str, secret: &str) -> Result<(), SecretError>;
    fn get(&self, account: &str) -> Option<String>;
}

pub fn account_for(provider_name: &str) -> String {
    format!("{ACCOUNT_PREFIX}{provider_name}")
}

/// Backend used when no OS keychain is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSecretStore;

impl SecretStore for NoSecretStore {
    fn is_available(&self) -> bool {
        false
    }

    fn store(&self, _account: &str, _secret: &str) -> Result<(), SecretError> {
        Err(SecretError::Unavailable)
    }

    fn get(&self, _account: &str) -> Option<String> {
        None
    }
}

/// OS keychain through the `keyring` crate.
#[derive(Debug, Clone)]
pub struct KeyringSecretStore {
    service: String,
}

impl KeyringSecretStore {
    /// Returns `None` when the platform store cannot be reached.
    pub fn detect() -> Option<Self> {
        let store = Self {
            service: SERVICE.to_string(),
        };
        match store
            .entry(&account_for("availability-check"))
            .and_then(|e| e.get_password())
        {
            Ok(_) | Err(keyring::Error::NoEntry) => Some(store),
            Err(e) => {
                debug!("credential store unavailable: {e}");
                None
            }
        }
    }

    fn entry(&self, account: &str) -> keyring::Result<keyring::Entry> {
        keyring::Entry::new(&self.service, account)
    }
}

impl SecretStore for KeyringSecretStore {
    fn is_available(&self) -> bool {
        true
    }

    fn store(&self, account: &str, secret: &str) -> Result<(), SecretError> {
        self.entry(account)
            .and_then(|e| e.set_password(secret))
            .map_err(|e| SecretError::Backend(e.to_string()))
    }

    fn get(&self, account: &str) -> Option<String> {
        self.entry(account).and_then(|e| e.get_password()).ok()
    }
}
