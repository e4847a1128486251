use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

pub const FALLBACK_PROVIDER_NAME: &str = "Custom Provider";

static SERVICE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(api|www|models|inferencing|gateway|llm|chat)\.").expect("static pattern")
});
static COMPAT_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^openai-compatible-").expect("static pattern"));

/// Derive a short provider title from an endpoint URL.
///
/// `https://api.xreatlabs.space/v1` becomes `Xreatlabs`. Anything without a
/// usable host yields [`FALLBACK_PROVIDER_NAME`].
pub fn extract_provider_name(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return FALLBACK_PROVIDER_NAME.to_string();
    };
    let Some(host) = parsed.host_str() else {
        return FALLBACK_PROVIDER_NAME.to_string();
    };

    let cleaned = SERVICE_LABEL.replace(host, "");
    let cleaned = COMPAT_LABEL.replace(&cleaned, "");
    let label = cleaned.split('.').next().unwrap_or_default();

    if label.is_empty() {
        FALLBACK_PROVIDER_NAME.to_string()
    } else {
        super::title_case(label)
    }
}
