//! Model catalog lookups against a provider's models endpoint.

pub mod http;
pub mod parse;

use async_trait::async_trait;

use crate::model::ProviderType;

pub use http::{ANTHROPIC_VERSION, HttpCatalog, models_url};
pub use parse::parse_models;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub owned_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub base_url: String,
    pub api_key: String,
    /// Path appended to the base URL; `None` or empty uses the type's default.
    pub models_endpoint: Option<String>,
    pub no_auth: bool,
    pub provider_type: ProviderType,
}

impl FetchRequest {
    /// The key to send, if any.
    pub fn auth_key(&self) -> Option<&str> {
        (!self.no_auth && !self.api_key.is_empty()).then_some(self.api_key.as_str())
    }

    fn endpoint(&self) -> Option<&str> {
        self.models_endpoint.as_deref().filter(|e| !e.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("{0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected response format from models endpoint")]
    UnexpectedShape,
}

/// Source of model listings; the wizard only talks to this seam.
#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<ModelInfo>, FetchError>;
}

/// Fetch, then retry with the other API flavour when the listing is empty.
///
/// An empty `anthropic` listing is retried as chat-completions; an empty
/// chat-completions listing is retried as `anthropic` against `/models`,
/// and errors of that last attempt are ignored.
pub async fn fetch_with_fallback(
    catalog: &dyn ModelCatalog,
    request: &FetchRequest,
) -> Result<Vec<ModelInfo>, FetchError> {
    let mut models = catalog.fetch(request).await?;

    if models.is_empty() && request.provider_type == ProviderType::Anthropic {
        tracing::debug!("empty anthropic listing; trying chat-completions endpoint");
        let retry = FetchRequest {
            provider_type: ProviderType::GenericChatCompletionApi,
            ..request.clone()
        };
        models = catalog.fetch(&retry).await?;
    }

    if models.is_empty() && request.provider_type == ProviderType::GenericChatCompletionApi {
        tracing::debug!("empty chat-completions listing; trying without /v1");
        let retry = FetchRequest {
            models_endpoint: Some("/models".to_string()),
            provider_type: ProviderType::Anthropic,
            ..request.clone()
        };
        match catalog.fetch(&retry).await {
            Ok(found) => models = found,
            Err(e) => tracing::debug!("fallback fetch failed: {}", e),
        }
    }

    Ok(models)
}

/// Label shown in model pickers.
pub fn format_choice(model: &ModelInfo) -> String {
    format!("{} ({})", model.id, model.owned_by)
}
