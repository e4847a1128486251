pub mod types;
pub mod validate;

pub use types::{
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODELS_ENDPOINT, MAX_OUTPUT_TOKENS_LIMIT, ModelConfig,
    ModelOptions, ProviderConfig, ProviderType, TrackedModel,
};
pub use validate::{
    UrlInput, ValidationError, generate_model_config, validate_openai_compatible_url, validate_url,
};
