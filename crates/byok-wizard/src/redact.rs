use crate::model::ModelConfig;

/// Mask an API key for logs and previews while keeping a hint of which key it is.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 12 {
        let head: String = chars[..6].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else if !chars.is_empty() {
        "***".to_string()
    } else {
        "<empty>".into()
    }
}

/// Copies of `configs` with their keys masked, for printing.
pub fn masked_configs(configs: &[ModelConfig]) -> Vec<ModelConfig> {
    configs
        .iter()
        .cloned()
        .map(|mut c| {
            c.api_key = c.api_key.as_deref().map(mask_secret);
            c
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProviderType;

    #[test]
    fn masks_by_length() {
        assert_eq!(mask_secret("sk-1234567890abcdef"), "sk-123...cdef");
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret(""), "<empty>");
    }

    #[test]
    fn multibyte_keys_do_not_split_characters() {
        assert_eq!(mask_secret("ééééééééééééé"), "éééééé...éééé");
    }

    #[test]
    fn masked_configs_leave_originals_alone() {
        let cfg = ModelConfig {
            model: "m".into(),
            display_name: "M [Acme]".into(),
            base_url: "https://api.acme.ai/v1".into(),
            api_key: Some("sk-1234567890abcdef".into()),
            provider: ProviderType::GenericChatCompletionApi,
            max_output_tokens: 16_384,
            supports_images: None,
            extra_args: None,
            extra_headers: None,
        };
        let masked = masked_configs(std::slice::from_ref(&cfg));
        assert_eq!(masked[0].api_key.as_deref(), Some("sk-123...cdef"));
        assert_eq!(cfg.api_key.as_deref(), Some("sk-1234567890abcdef"));
    }
}
