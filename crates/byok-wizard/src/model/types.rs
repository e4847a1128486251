use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 16_384;
pub const MAX_OUTPUT_TOKENS_LIMIT: u32 = 2_000_000;
pub const DEFAULT_MODELS_ENDPOINT: &str = "/models";

/// API compatibility of a provider, persisted as its wire string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProviderType {
    /// OpenAI Chat Completions compatible (`generic-chat-completion-api`).
    #[default]
    GenericChatCompletionApi,
    /// OpenAI Responses API (`openai`).
    OpenAi,
    /// Anthropic Messages API (`anthropic`).
    Anthropic,
    Other(String),
}

impl ProviderType {
    /// Choices offered when registering a custom provider.
    pub const CHOICES: [ProviderType; 3] = [
        ProviderType::GenericChatCompletionApi,
        ProviderType::OpenAi,
        ProviderType::Anthropic,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ProviderType::GenericChatCompletionApi => "generic-chat-completion-api",
            ProviderType::OpenAi => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Other(s) => s,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ProviderType::GenericChatCompletionApi => {
                "OpenAI-compatible (Chat Completions API)".to_string()
            }
            ProviderType::OpenAi => "OpenAI (Responses API)".to_string(),
            ProviderType::Anthropic => "Anthropic (Messages API)".to_string(),
            ProviderType::Other(s) => s.clone(),
        }
    }
}

impl From<String> for ProviderType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "generic-chat-completion-api" => ProviderType::GenericChatCompletionApi,
            "openai" => ProviderType::OpenAi,
            "anthropic" => ProviderType::Anthropic,
            _ => ProviderType::Other(s),
        }
    }
}

impl From<&str> for ProviderType {
    fn from(s: &str) -> Self {
        ProviderType::from(s.to_string())
    }
}

impl From<ProviderType> for String {
    fn from(p: ProviderType) -> Self {
        match p {
            ProviderType::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of `customModels` in the host application's settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    pub model: String,
    pub display_name: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub provider: ProviderType,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supports_images: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<BTreeMap<String, String>>,
}

/// Inputs for [`super::generate_model_config`].
#[derive(Debug, Clone, Default)]
pub struct ModelOptions {
    pub model: String,
    pub display_name: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub provider: ProviderType,
    /// `None` or `Some(0)` selects the default.
    pub max_output_tokens: Option<u32>,
    pub supports_images: bool,
    pub extra_args: Option<Map<String, Value>>,
    pub extra_headers: Option<BTreeMap<String, String>>,
}

/// A provider remembered by the wizard in `providers.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub name: String,
    pub base_url: String,
    pub provider_type: ProviderType,
    #[serde(default = "default_models_endpoint")]
    pub models_endpoint: String,
    #[serde(default)]
    pub no_auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, provider_type: ProviderType) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            provider_type,
            models_endpoint: default_models_endpoint(),
            no_auth: false,
            api_key: None,
        }
    }
}

/// A model the wizard has added, kept in `models.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedModel {
    pub model_id: String,
    pub provider_name: String,
    pub base_url: String,
    pub display_name: String,
    pub max_output_tokens: u32,
    pub supports_images: bool,
    pub provider: ProviderType,
    #[serde(default)]
    pub added_at: String,
}

fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}

fn default_models_endpoint() -> String {
    DEFAULT_MODELS_ENDPOINT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_type_round_trips_unknown_strings() {
        let p: ProviderType = serde_json::from_value(json!("bedrock")).unwrap();
        assert_eq!(p, ProviderType::Other("bedrock".into()));
        assert_eq!(serde_json::to_value(&p).unwrap(), json!("bedrock"));
        assert_eq!(
            serde_json::to_value(ProviderType::GenericChatCompletionApi).unwrap(),
            json!("generic-chat-completion-api")
        );
    }

    #[test]
    fn model_config_uses_camel_case_and_skips_absent_fields() {
        let cfg = ModelConfig {
            model: "gpt-4o".into(),
            display_name: "GPT 4o [Acme]".into(),
            base_url: "https://api.acme.ai/v1".into(),
            api_key: None,
            provider: ProviderType::OpenAi,
            max_output_tokens: 4096,
            supports_images: None,
            extra_args: None,
            extra_headers: None,
        };
        let v = serde_json::to_value(&cfg).unwrap();
        assert_eq!(
            v,
            json!({
                "model": "gpt-4o",
                "displayName": "GPT 4o [Acme]",
                "baseUrl": "https://api.acme.ai/v1",
                "provider": "openai",
                "maxOutputTokens": 4096
            })
        );
    }

    #[test]
    fn provider_defaults_fill_in_on_read() {
        let p: ProviderConfig = serde_json::from_value(json!({
            "name": "Acme",
            "baseUrl": "https://api.acme.ai/v1",
            "providerType": "generic-chat-completion-api"
        }))
        .unwrap();
        assert_eq!(p.models_endpoint, "/models");
        assert!(!p.no_auth);
        assert_eq!(p.api_key, None);
    }

    #[test]
    fn max_tokens_default_when_missing() {
        let cfg: ModelConfig = serde_json::from_value(json!({
            "model": "m",
            "displayName": "M",
            "baseUrl": "http://localhost:8000/v1",
            "provider": "anthropic"
        }))
        .unwrap();
        assert_eq!(cfg.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
    }
}
