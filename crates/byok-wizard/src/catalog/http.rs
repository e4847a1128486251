use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

use super::{FetchError, FetchRequest, ModelCatalog, ModelInfo, parse_models};
use crate::model::ProviderType;
use crate::redact::mask_secret;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Full listing URL for a request.
///
/// Chat-completions style providers get `/v1` appended when the base lacks
/// it; anthropic defaults to `/v1/models`; everything else to `/models`.
pub fn models_url(request: &FetchRequest) -> String {
    let base = request.base_url.strip_suffix('/').unwrap_or(&request.base_url);
    match request.provider_type {
        ProviderType::GenericChatCompletionApi | ProviderType::OpenAi => {
            let endpoint = request.endpoint().unwrap_or("/models");
            if base.ends_with("/v1") {
                format!("{base}{endpoint}")
            } else {
                format!("{base}/v1{endpoint}")
            }
        }
        ProviderType::Anthropic => {
            format!("{base}{}", request.endpoint().unwrap_or("/v1/models"))
        }
        ProviderType::Other(_) => format!("{base}{}", request.endpoint().unwrap_or("/models")),
    }
}

/// [`ModelCatalog`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("byok-wizard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ModelCatalog for HttpCatalog {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<ModelInfo>, FetchError> {
        let url = models_url(request);
        let mut builder = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(key) = request.auth_key() {
            tracing::debug!(
                "fetching models url={} type={} key={}",
                url,
                request.provider_type,
                mask_secret(key)
            );
            builder = match request.provider_type {
                ProviderType::Anthropic => builder
                    .header("x-api-key", key)
                    .header("anthropic-version", ANTHROPIC_VERSION),
                _ => builder.bearer_auth(key),
            };
        } else {
            tracing::debug!("fetching models url={} type={} (no auth)", url, request.provider_type);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: Value = response.json().await?;
        let models = parse_models(&body)?;
        tracing::info!("fetched {} model(s) from {}", models.len(), url);
        Ok(models)
    }
}
