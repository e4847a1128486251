use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::DEFAULT_MAX_OUTPUT_TOKENS;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SETTINGS_PATH: &str = "~/.factory/settings.json";

#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    pub logging: Option<LoggingCfg>,
    pub wizard: Option<WizardCfg>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingCfg {
    pub to_file: Option<bool>,
    pub dir: Option<String>,
    pub json: Option<bool>,
    pub compact: Option<bool>,
    pub pretty: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WizardCfg {
    pub default_max_output_tokens: Option<u32>,
    pub fetch_timeout_secs: Option<u64>,
    pub settings_path: Option<String>, // `~/` is expanded
}

pub fn load_user_config(byok_home: &Path) -> anyhow::Result<Option<UserConfig>> {
    let path = byok_home.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)?;
    let cfg: UserConfig = toml::from_str(&s)?;
    Ok(Some(cfg))
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// `explicit` when set, else `$HOME/.byok-cli`, else `./.byok-cli`.
pub fn resolve_byok_home(explicit: &str) -> PathBuf {
    if !explicit.is_empty() {
        expand_home(explicit)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".byok-cli")
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".byok-cli")
    }
}

/// Values that came from explicitly set environment variables.
#[derive(Debug, Default, Clone)]
pub struct WizardEnv {
    pub settings_path: Option<String>,
    pub fetch_timeout_secs: Option<u64>,
    pub default_max_output_tokens: Option<u32>,
}

/// Effective wizard knobs: environment, then `[wizard]` in config.toml, then defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSettings {
    pub byok_home: PathBuf,
    pub settings_path: PathBuf,
    pub fetch_timeout: Duration,
    pub default_max_output_tokens: u32,
}

impl WizardSettings {
    pub fn resolve(byok_home: PathBuf, user_cfg: Option<&UserConfig>, env: &WizardEnv) -> Self {
        let file = user_cfg.and_then(|c| c.wizard.as_ref());

        let settings_path = env
            .settings_path
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| file.and_then(|w| w.settings_path.clone()))
            .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string());
        let fetch_timeout_secs = env
            .fetch_timeout_secs
            .or_else(|| file.and_then(|w| w.fetch_timeout_secs))
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        let default_max_output_tokens = env
            .default_max_output_tokens
            .or_else(|| file.and_then(|w| w.default_max_output_tokens))
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS);

        Self {
            byok_home,
            settings_path: expand_home(&settings_path),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            default_max_output_tokens,
        }
    }
}
