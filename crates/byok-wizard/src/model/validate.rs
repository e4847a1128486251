use reqwest::Url;

use super::types::{
    DEFAULT_MAX_OUTPUT_TOKENS, MAX_OUTPUT_TOKENS_LIMIT, ModelConfig, ModelOptions, ProviderConfig,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("URL is required")]
    UrlRequired,
    #[error("URL must use http:// or https:// protocol")]
    UnsupportedScheme,
    #[error("URL must have a valid hostname")]
    MissingHost,
    #[error("Invalid URL format")]
    InvalidUrl,
    #[error("OpenAI-compatible URLs must end with /v1 (e.g., https://api.example.com/v1)")]
    MissingV1Suffix,
    #[error("Invalid model configuration: {field} {reason}")]
    Model { field: &'static str, reason: String },
    #[error("Invalid provider configuration: {field} {reason}")]
    Provider { field: &'static str, reason: String },
}

/// Result of a URL prompt: either a usable URL or the `back` keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlInput {
    Back,
    Url(String),
}

/// Accept `back` (any case) or an absolute http(s) URL with a host.
///
/// The returned URL is the trimmed input, not the parser's normalized form.
pub fn validate_url(input: &str) -> Result<UrlInput, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::UrlRequired);
    }
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("back") {
        return Ok(UrlInput::Back);
    }

    let parsed = Url::parse(trimmed).map_err(|_| ValidationError::InvalidUrl)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme);
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost);
    }
    Ok(UrlInput::Url(trimmed.to_string()))
}

/// [`validate_url`] plus the `/v1` path requirement of chat-completions providers.
pub fn validate_openai_compatible_url(input: &str) -> Result<UrlInput, ValidationError> {
    match validate_url(input)? {
        UrlInput::Back => Ok(UrlInput::Back),
        UrlInput::Url(url) => {
            if url.trim_end_matches('/').ends_with("/v1") {
                Ok(UrlInput::Url(url))
            } else {
                Err(ValidationError::MissingV1Suffix)
            }
        }
    }
}

fn is_url(s: &str) -> bool {
    Url::parse(s).is_ok()
}

impl ModelConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let bad = |field, reason: &str| ValidationError::Model {
            field,
            reason: reason.to_string(),
        };
        if self.model.is_empty() {
            return Err(bad("model", "must not be empty"));
        }
        if self.display_name.is_empty() {
            return Err(bad("displayName", "must not be empty"));
        }
        if !is_url(&self.base_url) {
            return Err(bad("baseUrl", "must be a valid URL"));
        }
        if self.provider.as_str().is_empty() {
            return Err(bad("provider", "must not be empty"));
        }
        if !(1..=MAX_OUTPUT_TOKENS_LIMIT).contains(&self.max_output_tokens) {
            return Err(ValidationError::Model {
                field: "maxOutputTokens",
                reason: format!("must be between 1 and {MAX_OUTPUT_TOKENS_LIMIT}"),
            });
        }
        Ok(())
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let bad = |field, reason: &str| ValidationError::Provider {
            field,
            reason: reason.to_string(),
        };
        if self.name.is_empty() {
            return Err(bad("name", "must not be empty"));
        }
        if !is_url(&self.base_url) {
            return Err(bad("baseUrl", "must be a valid URL"));
        }
        if self.provider_type.as_str().is_empty() {
            return Err(bad("providerType", "must not be empty"));
        }
        Ok(())
    }
}

/// Build a validated settings entry.
///
/// Optional fields are only emitted when they carry information: images only
/// when supported, extras only when non-empty, the key only when non-empty.
pub fn generate_model_config(options: ModelOptions) -> Result<ModelConfig, ValidationError> {
    let max_output_tokens = match options.max_output_tokens {
        None | Some(0) => DEFAULT_MAX_OUTPUT_TOKENS,
        Some(n) => n,
    };
    let config = ModelConfig {
        model: options.model,
        display_name: options.display_name,
        base_url: options.base_url,
        api_key: options.api_key.filter(|k| !k.is_empty()),
        provider: options.provider,
        max_output_tokens,
        supports_images: options.supports_images.then_some(true),
        extra_args: options.extra_args.filter(|m| !m.is_empty()),
        extra_headers: options.extra_headers.filter(|m| !m.is_empty()),
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProviderType;
    use serde_json::{Map, json};
    use std::collections::BTreeMap;

    fn options() -> ModelOptions {
        ModelOptions {
            model: "llama-3.1-8b".into(),
            display_name: "LLaMA 3.1 8B [Acme]".into(),
            base_url: "https://api.acme.ai/v1".into(),
            api_key: Some("sk-test".into()),
            provider: ProviderType::GenericChatCompletionApi,
            ..Default::default()
        }
    }

    #[test]
    fn back_keyword_in_any_case() {
        assert_eq!(validate_url("  BACK "), Ok(UrlInput::Back));
        assert_eq!(validate_openai_compatible_url("back"), Ok(UrlInput::Back));
    }

    #[test]
    fn url_errors_carry_user_messages() {
        assert_eq!(validate_url(""), Err(ValidationError::UrlRequired));
        assert_eq!(validate_url("   "), Err(ValidationError::InvalidUrl));
        assert_eq!(validate_url("api.acme.ai"), Err(ValidationError::InvalidUrl));
        assert_eq!(
            validate_url("ftp://files.acme.ai"),
            Err(ValidationError::UnsupportedScheme)
        );
        assert_eq!(
            ValidationError::MissingV1Suffix.to_string(),
            "OpenAI-compatible URLs must end with /v1 (e.g., https://api.example.com/v1)"
        );
    }

    #[test]
    fn valid_url_is_returned_trimmed_not_normalized() {
        assert_eq!(
            validate_url(" https://API.acme.ai/v1/ "),
            Ok(UrlInput::Url("https://API.acme.ai/v1/".into()))
        );
    }

    #[test]
    fn openai_compatible_requires_v1() {
        assert!(validate_openai_compatible_url("https://api.acme.ai/v1").is_ok());
        assert!(validate_openai_compatible_url("https://api.acme.ai/v1///").is_ok());
        assert_eq!(
            validate_openai_compatible_url("https://api.acme.ai"),
            Err(ValidationError::MissingV1Suffix)
        );
        assert_eq!(
            validate_openai_compatible_url("https://api.acme.ai/v1beta"),
            Err(ValidationError::MissingV1Suffix)
        );
    }

    #[test]
    fn generate_applies_defaults_and_omits_empty_extras() {
        let cfg = generate_model_config(ModelOptions {
            max_output_tokens: Some(0),
            extra_args: Some(Map::new()),
            extra_headers: Some(BTreeMap::new()),
            ..options()
        })
        .unwrap();
        assert_eq!(cfg.max_output_tokens, 16_384);
        assert_eq!(cfg.supports_images, None);
        assert_eq!(cfg.extra_args, None);
        assert_eq!(cfg.extra_headers, None);
    }

    #[test]
    fn generate_keeps_populated_fields() {
        let mut args = Map::new();
        args.insert("temperature".into(), json!(0.7));
        let cfg = generate_model_config(ModelOptions {
            supports_images: true,
            max_output_tokens: Some(8192),
            extra_args: Some(args.clone()),
            ..options()
        })
        .unwrap();
        assert_eq!(cfg.supports_images, Some(true));
        assert_eq!(cfg.max_output_tokens, 8192);
        assert_eq!(cfg.extra_args, Some(args));
        assert_eq!(cfg.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn empty_key_is_dropped() {
        let cfg = generate_model_config(ModelOptions {
            api_key: Some(String::new()),
            ..options()
        })
        .unwrap();
        assert_eq!(cfg.api_key, None);
    }

    #[test]
    fn generate_rejects_invalid_records() {
        let err = generate_model_config(ModelOptions {
            max_output_tokens: Some(2_000_001),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::Model { field: "maxOutputTokens", .. }));

        let err = generate_model_config(ModelOptions {
            base_url: "not a url".into(),
            ..options()
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::Model { field: "baseUrl", .. }));

        let err = generate_model_config(ModelOptions {
            display_name: String::new(),
            ..options()
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid model configuration: displayName"));
    }

    #[test]
    fn provider_validation() {
        let ok = ProviderConfig::new("Acme", "https://api.acme.ai/v1", ProviderType::Anthropic);
        assert!(ok.validate().is_ok());
        let no_name = ProviderConfig::new("", "https://api.acme.ai/v1", ProviderType::Anthropic);
        assert!(no_name.validate().is_err());
        let bad_type = ProviderConfig::new("Acme", "https://api.acme.ai", ProviderType::from(""));
        assert!(matches!(
            bad_type.validate(),
            Err(ValidationError::Provider { field: "providerType", .. })
        ));
    }
}
