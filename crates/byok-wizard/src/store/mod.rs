//! JSON-file persistence for the host settings and the wizard's own records.
//!
//! Every mutation runs under [`lock::with_file_lock`] and lands through an
//! atomic rename.

pub mod fsutil;
pub mod lock;
pub mod providers;
pub mod secrets;
pub mod settings;
pub mod tracked;

use std::io;
use std::path::{Path, PathBuf};

use crate::model::ValidationError;

pub use secrets::{KeyringSecretStore, NoSecretStore, SecretError, SecretStore};
pub use settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Host application settings (`customModels` lives here).
    pub settings: PathBuf,
    pub byok_dir: PathBuf,
    pub providers: PathBuf,
    pub models: PathBuf,
}

impl StorePaths {
    pub fn new(settings: PathBuf, byok_dir: PathBuf) -> Self {
        Self {
            providers: byok_dir.join("providers.json"),
            models: byok_dir.join("models.json"),
            settings,
            byok_dir,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("timed out waiting for lock on {}", .path.display())]
    LockTimeout { path: PathBuf },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Handle over the three JSON files and the credential backend.
pub struct ConfigStore {
    paths: StorePaths,
    secrets: Box<dyn SecretStore>,
}

impl ConfigStore {
    pub fn new(paths: StorePaths) -> Self {
        Self {
            paths,
            secrets: Box::new(NoSecretStore),
        }
    }

    pub fn with_secret_store(mut self, secrets: impl SecretStore + 'static) -> Self {
        self.secrets = Box::new(secrets);
        self
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    pub fn settings_path(&self) -> &Path {
        &self.paths.settings
    }

    pub fn ensure_byok_dir(&self) -> Result<(), StoreError> {
        fsutil::ensure_secure_dir(&self.paths.byok_dir)
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("paths", &self.paths)
            .field("secure_storage", &self.secrets.is_available())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A store rooted in a fresh temp dir; keep the `TempDir` alive.
    pub fn temp_store() -> (tempfile::TempDir, ConfigStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = StorePaths::new(
            dir.path().join(".factory/settings.json"),
            dir.path().join(".byok-cli"),
        );
        (dir, ConfigStore::new(paths))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_derive_from_byok_dir() {
        let p = StorePaths::new("/h/.factory/settings.json".into(), "/h/.byok-cli".into());
        assert_eq!(p.providers, PathBuf::from("/h/.byok-cli/providers.json"));
        assert_eq!(p.models, PathBuf::from("/h/.byok-cli/models.json"));
    }

    #[test]
    fn io_error_message_names_the_path() {
        let e = StoreError::io(
            "read",
            Path::new("/x/settings.json"),
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(e.to_string(), "failed to read /x/settings.json: denied");
    }
}
