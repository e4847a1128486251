use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use super::fsutil::{read_json, write_json};
use super::lock::with_file_lock;
use super::{ConfigStore, StoreError};
use crate::model::TrackedModel;

impl ConfigStore {
    pub fn read_tracked_models(&self) -> Result<Vec<TrackedModel>, StoreError> {
        self.ensure_byok_dir()?;
        let items = match read_json(&self.paths.models)? {
            Some(Value::Array(items)) => items,
            _ => return Ok(Vec::new()),
        };
        Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    pub fn tracked_models_by_provider(&self, base_url: &str) -> Result<Vec<TrackedModel>, StoreError> {
        Ok(self
            .read_tracked_models()?
            .into_iter()
            .filter(|m| m.base_url == base_url)
            .collect())
    }

    /// Record `model`, replacing any entry with the same id and base URL.
    ///
    /// `added_at` is overwritten with the current UTC time.
    pub async fn track_model(&self, mut model: TrackedModel) -> Result<PathBuf, StoreError> {
        self.ensure_byok_dir()?;
        let path = self.paths.models.clone();
        model.added_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        with_file_lock(&path, "[]", || {
            let mut models = self.read_tracked_models()?;
            match models
                .iter()
                .position(|m| m.model_id == model.model_id && m.base_url == model.base_url)
            {
                Some(i) => models[i] = model,
                None => models.push(model),
            }
            write_json(&path, &models)?;
            Ok(path.clone())
        })
        .await
    }
}
