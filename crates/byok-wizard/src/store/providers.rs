use std::path::PathBuf;

use serde_json::Value;

use super::fsutil::{read_json, write_json};
use super::lock::with_file_lock;
use super::secrets::account_for;
use super::{ConfigStore, StoreError};
use crate::model::ProviderConfig;

impl ConfigStore {
    /// Saved providers, with keys filled from the credential store when it has them.
    ///
    /// Entries that do not parse or validate are skipped.
    pub fn read_saved_providers(&self) -> Result<Vec<ProviderConfig>, StoreError> {
        self.ensure_byok_dir()?;
        let items = match read_json(&self.paths.providers)? {
            Some(Value::Array(items)) => items,
            _ => return Ok(Vec::new()),
        };

        let mut providers = Vec::with_capacity(items.len());
        for item in items {
            let mut provider: ProviderConfig = match serde_json::from_value(item) {
                Ok(p) => p,
                Err(e) => {
                    tracing::debug!("skipping unreadable provider entry: {}", e);
                    continue;
                }
            };
            if let Err(e) = provider.validate() {
                tracing::debug!("skipping invalid provider {}: {}", provider.name, e);
                continue;
            }
            if let Some(key) = self.secrets.get(&account_for(&provider.name)) {
                provider.api_key = Some(key);
            }
            providers.push(provider);
        }
        Ok(providers)
    }

    /// Insert or replace the first provider matching by name or base URL.
    ///
    /// The key goes to the credential store when one is available, and the
    /// file copy is then left out. `no_auth` providers never keep a key.
    pub async fn save_provider(&self, provider: &ProviderConfig) -> Result<PathBuf, StoreError> {
        provider.validate()?;
        self.ensure_byok_dir()?;
        let path = self.paths.providers.clone();

        with_file_lock(&path, "[]", || {
            let mut providers = self.read_saved_providers()?;

            let mut record = provider.clone();
            if record.no_auth {
                record.api_key = None;
            }
            match providers
                .iter()
                .position(|p| p.name == record.name || p.base_url == record.base_url)
            {
                Some(i) => providers[i] = record,
                None => providers.push(record),
            }

            if let Some(key) = provider.api_key.as_deref()
                && !key.is_empty()
                && !provider.no_auth
                && self.secrets.is_available()
            {
                match self.secrets.store(&account_for(&provider.name), key) {
                    Ok(()) => tracing::debug!("stored key for provider={} in credential store", provider.name),
                    Err(e) => tracing::warn!("keeping key for provider={} in file: {}", provider.name, e),
                }
            }

            let on_disk: Vec<ProviderConfig> = providers
                .into_iter()
                .map(|p| self.without_stored_key(p))
                .collect();
            write_json(&path, &on_disk)?;
            tracing::info!("saved provider name={} base_url={}", provider.name, provider.base_url);
            Ok(path.clone())
        })
        .await
    }

    pub fn saved_provider_by_name(&self, name: &str) -> Result<Option<ProviderConfig>, StoreError> {
        Ok(self
            .read_saved_providers()?
            .into_iter()
            .find(|p| p.name == name))
    }

    pub fn saved_provider_by_base_url(
        &self,
        base_url: &str,
    ) -> Result<Option<ProviderConfig>, StoreError> {
        Ok(self
            .read_saved_providers()?
            .into_iter()
            .find(|p| p.base_url == base_url))
    }

    fn without_stored_key(&self, mut provider: ProviderConfig) -> ProviderConfig {
        let held = provider.api_key.is_some()
            && self.secrets.get(&account_for(&provider.name)) == provider.api_key;
        if held {
            provider.api_key = None;
        }
        provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProviderType;
    use crate::store::secrets::memory::MemorySecretStore;
    use crate::store::testing::temp_store;
    use std::fs;

    fn acme() -> ProviderConfig {
        ProviderConfig {
            api_key: Some("sk-acme".into()),
            ..ProviderConfig::new("Acme", "https://api.acme.ai/v1", ProviderType::GenericChatCompletionApi)
        }
    }

    fn raw_file(store: &ConfigStore) -> Value {
        serde_json::from_str(&fs::read_to_string(&store.paths().providers).unwrap()).unwrap()
    }

    #[test]
    fn empty_when_nothing_saved() {
        let (_dir, store) = temp_store();
        assert!(store.read_saved_providers().unwrap().is_empty());
        assert!(store.paths().byok_dir.is_dir());
    }

    #[tokio::test]
    async fn key_stays_in_file_without_credential_store() {
        let (_dir, store) = temp_store();
        store.save_provider(&acme()).await.unwrap();
        assert_eq!(raw_file(&store)[0]["apiKey"], "sk-acme");
        let back = store.saved_provider_by_name("Acme").unwrap().unwrap();
        assert_eq!(back.api_key.as_deref(), Some("sk-acme"));
        assert_eq!(back.models_endpoint, "/models");
    }

    #[tokio::test]
    async fn key_moves_to_credential_store_when_available() {
        let (_dir, store) = temp_store();
        let secrets = MemorySecretStore::default();
        let store = store.with_secret_store(secrets.clone());

        store.save_provider(&acme()).await.unwrap();
        assert!(raw_file(&store)[0].get("apiKey").is_none());
        assert_eq!(
            secrets.entries.lock().unwrap().get("provider-Acme").map(String::as_str),
            Some("sk-acme")
        );
        let back = store.saved_provider_by_base_url("https://api.acme.ai/v1").unwrap().unwrap();
        assert_eq!(back.api_key.as_deref(), Some("sk-acme"));
    }

    #[tokio::test]
    async fn no_auth_providers_never_keep_a_key() {
        let (_dir, store) = temp_store();
        let secrets = MemorySecretStore::default();
        let store = store.with_secret_store(secrets.clone());
        let local = ProviderConfig {
            no_auth: true,
            api_key: Some("ignored".into()),
            ..ProviderConfig::new("Local", "http://localhost:11434/v1", ProviderType::GenericChatCompletionApi)
        };
        store.save_provider(&local).await.unwrap();
        assert!(raw_file(&store)[0].get("apiKey").is_none());
        assert!(secrets.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_matches_on_name_or_base_url() {
        let (_dir, store) = temp_store();
        store.save_provider(&acme()).await.unwrap();

        let renamed = ProviderConfig {
            name: "Acme Prod".into(),
            ..acme()
        };
        store.save_provider(&renamed).await.unwrap();
        let moved = ProviderConfig {
            base_url: "https://eu.acme.ai/v1".into(),
            ..renamed.clone()
        };
        store.save_provider(&moved).await.unwrap();
        store
            .save_provider(&ProviderConfig::new("Other", "https://other.ai/v1", ProviderType::Anthropic))
            .await
            .unwrap();

        let all = store.read_saved_providers().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Acme Prod");
        assert_eq!(all[0].base_url, "https://eu.acme.ai/v1");
        assert_eq!(all[1].provider_type, ProviderType::Anthropic);
    }

    #[test]
    fn invalid_entries_are_skipped_on_read() {
        let (_dir, store) = temp_store();
        store.ensure_byok_dir().unwrap();
        fs::write(
            &store.paths().providers,
            r#"[{"name": ""}, {"name": "Ok", "baseUrl": "https://ok.ai/v1", "providerType": "openai"}, 7]"#,
        )
        .unwrap();
        let all = store.read_saved_providers().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Ok");
    }

    #[tokio::test]
    async fn invalid_provider_is_rejected() {
        let (_dir, store) = temp_store();
        let bad = ProviderConfig::new("", "https://api.acme.ai/v1", ProviderType::OpenAi);
        assert!(matches!(store.save_provider(&bad).await, Err(StoreError::Invalid(_))));
    }
}
