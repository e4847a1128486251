//! Static lookup tables used by the normalizer.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Brand keyword → canonical spelling.
pub static BRANDS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (key, canon) in [
        ("gpt", "GPT"),
        ("llama", "LLaMA"),
        ("claude", "Claude"),
        ("gemini", "Gemini"),
        ("qwen", "Qwen"),
        ("mistral", "Mistral"),
        ("mixtral", "Mixtral"),
        ("deepseek", "DeepSeek"),
        ("codestral", "Codestral"),
        ("phi", "Phi"),
        ("yi", "Yi"),
        ("glm", "GLM"),
        ("kimi", "Kimi"),
        ("granite", "Granite"),
        ("falcon", "Falcon"),
        ("vicuna", "Vicuna"),
        ("wizardlm", "WizardLM"),
        ("starcoder", "StarCoder"),
        ("codellama", "CodeLLaMA"),
        ("solar", "Solar"),
        ("command", "Command"),
        ("dbrx", "DBRX"),
        ("jamba", "Jamba"),
        ("nemotron", "Nemotron"),
        ("olmo", "OLMo"),
        ("aya", "Aya"),
        ("zephyr", "Zephyr"),
        ("openchat", "OpenChat"),
        ("openhermes", "OpenHermes"),
        ("nous", "Nous"),
        ("hermes", "Hermes"),
        ("dolphin", "Dolphin"),
        ("neural", "Neural"),
        ("titan", "Titan"),
        ("palm", "PaLM"),
        ("bard", "Bard"),
        ("cohere", "Cohere"),
        ("ai", "AI"),
        ("moe", "MoE"),
        ("minimax", "MiniMax"),
        ("oss", "OSS"),
    ] {
        m.insert(key, canon);
    }
    m
});

/// Purpose/variant keyword → canonical spelling.
pub static PURPOSES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    for (key, canon) in [
        ("instruct", "Instruct"),
        ("chat", "Chat"),
        ("base", "Base"),
        ("vision", "Vision"),
        ("coder", "Coder"),
        ("code", "Code"),
        ("embed", "Embed"),
        ("embedding", "Embedding"),
        ("guard", "Guard"),
        ("guardian", "Guardian"),
        ("turbo", "Turbo"),
        ("preview", "Preview"),
        ("pro", "Pro"),
        ("ultra", "Ultra"),
        ("flash", "Flash"),
        ("haiku", "Haiku"),
        ("sonnet", "Sonnet"),
        ("opus", "Opus"),
        ("mini", "Mini"),
        ("nano", "Nano"),
        ("micro", "Micro"),
        ("large", "Large"),
        ("medium", "Medium"),
        ("small", "Small"),
        ("scout", "Scout"),
        ("maverick", "Maverick"),
        ("lite", "Lite"),
        ("plus", "Plus"),
        ("max", "Max"),
        ("distill", "Distill"),
        ("reasoning", "Reasoning"),
        ("thinking", "Thinking"),
        ("terminus", "Terminus"),
        ("it", "IT"),
        ("hf", "HF"),
        ("use", "Use"),
        ("computer", "Computer"),
        ("image", "Image"),
    ] {
        m.insert(key, canon);
    }
    m
});

/// Hosting/organization prefixes, stripped in this order.
pub const PROVIDER_PREFIXES: &[&str] = &[
    "anthropic/",
    "openai/",
    "meta-llama/",
    "meta/",
    "mistralai/",
    "google/",
    "deepseek-ai/",
    "qwen/",
    "alibaba/",
    "microsoft/",
    "nvidia/",
    "ibm-granite/",
    "ibm/",
    "cohere/",
    "accounts/fireworks/models/",
    "accounts/fireworks/",
    "fireworks/",
    "together/",
    "anyscale/",
    "perplexity/",
    "groq/",
    "huggingface/",
    "hf/",
    "thebloke/",
    "nousresearch/",
    "teknium/",
    "cognitivecomputations/",
    "openchat/",
    "lmsys/",
    "berkeley-nest/",
    "stabilityai/",
    "stability/",
    "databricks/",
    "snowflake/",
    "ai21/",
    "writer/",
    "amazon/",
    "aws/",
    "zai-org/",
    "moonshotai/",
];

/// File extensions, precision and quantization tags, stripped in this order.
pub const SUFFIXES: &[&str] = &[
    ".gguf",
    ".safetensors",
    ".bin",
    ".pt",
    ".pth",
    "-gguf",
    "-safetensors",
    "-fp16",
    "-fp32",
    "-bf16",
    "-fp8",
    "-int8",
    "-int4",
    "-awq",
    "-gptq",
    "-bnb",
    "-nf4",
    "-q4_0",
    "-q4_1",
    "-q4_k",
    "-q4_k_m",
    "-q4_k_s",
    "-q5_0",
    "-q5_1",
    "-q5_k",
    "-q5_k_m",
    "-q5_k_s",
    "-q6_k",
    "-q8_0",
    "-iq2_xxs",
    "-iq2_xs",
    "-iq3_xxs",
    "-exl2",
    ":latest",
];

/// Canonical spelling of a brand keyword (case-insensitive).
pub fn brand(word: &str) -> Option<&'static str> {
    BRANDS.get(word.to_lowercase().as_str()).copied()
}

/// Canonical spelling of a purpose keyword (case-insensitive).
pub fn purpose(word: &str) -> Option<&'static str> {
    PURPOSES.get(word.to_lowercase().as_str()).copied()
}
