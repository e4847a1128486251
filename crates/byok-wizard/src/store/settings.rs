use std::path::PathBuf;

use serde_json::{Map, Value};

use super::fsutil::{read_json, write_json};
use super::lock::with_file_lock;
use super::{ConfigStore, StoreError};
use crate::model::ModelConfig;

const CUSTOM_MODELS: &str = "customModels";

/// The part of the host settings the wizard reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Entries as found on disk; they may not all match [`ModelConfig`].
    pub custom_models: Vec<Value>,
}

impl ConfigStore {
    /// Whole settings object, unknown fields included.
    ///
    /// Missing, invalid or non-object content reads as empty.
    pub fn read_settings_raw(&self) -> Result<Map<String, Value>, StoreError> {
        Ok(match read_json(&self.paths.settings)? {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        })
    }

    pub fn read_settings(&self) -> Result<Settings, StoreError> {
        let mut raw = self.read_settings_raw()?;
        let custom_models = match raw.remove(CUSTOM_MODELS) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        Ok(Settings { custom_models })
    }

    /// Insert or replace the entry with the same `model` and `baseUrl`.
    ///
    /// Every other field of the settings file is written back untouched.
    pub async fn add_model_to_settings(&self, config: &ModelConfig) -> Result<PathBuf, StoreError> {
        config.validate()?;
        let path = self.paths.settings.clone();

        with_file_lock(&path, "{}", || {
            let mut settings = self.read_settings_raw()?;
            let entry = serde_json::to_value(config).map_err(|source| StoreError::Serialize {
                path: path.clone(),
                source,
            })?;

            let models = settings
                .entry(CUSTOM_MODELS)
                .or_insert_with(|| Value::Array(Vec::new()));
            if !models.is_array() {
                *models = Value::Array(Vec::new());
            }
            if let Value::Array(items) = models {
                let existing = items.iter().position(|m| {
                    m.get("model").and_then(Value::as_str) == Some(config.model.as_str())
                        && m.get("baseUrl").and_then(Value::as_str)
                            == Some(config.base_url.as_str())
                });
                match existing {
                    Some(i) => {
                        tracing::info!("updating model={} base_url={}", config.model, config.base_url);
                        items[i] = entry;
                    }
                    None => {
                        tracing::info!("adding model={} base_url={}", config.model, config.base_url);
                        items.push(entry);
                    }
                }
            }

            write_json(&path, &settings)?;
            Ok(path.clone())
        })
        .await
    }
}
