use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use env_flags::env_flags;
use once_cell::sync::OnceCell;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::Registry;

use byok_wizard::catalog::HttpCatalog;
use byok_wizard::cli::{Cli, Command};
use byok_wizard::config::{
    UserConfig, WizardEnv, WizardSettings, load_user_config, resolve_byok_home,
};
use byok_wizard::naming::normalize_model_name;
use byok_wizard::store::{ConfigStore, KeyringSecretStore, StorePaths};
use byok_wizard::wizard::{Outcome, PromptError, TerminalPrompter, Wizard};

#[derive(Clone, Copy)]
enum LogStyle {
    Json,
    Compact,
    Pretty,
    Full,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(style: LogStyle, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);
    match style {
        LogStyle::Json => base.json().boxed(),
        LogStyle::Compact => base.compact().boxed(),
        LogStyle::Pretty => base.pretty().boxed(),
        LogStyle::Full => base.boxed(),
    }
}

fn init_tracing(byok_home: &Path, user_cfg: Option<&UserConfig>) {
    env_flags! {
        /// Tracing filter, e.g. "info", "debug", or targets format.
        RUST_LOG: &str = "warn";
        /// Preferred filter env (alias). If set, overrides RUST_LOG.
        TRACING_FILTER: &str = "";
        /// Pretty formatting for logs (ignored if TRACING_JSON=true).
        TRACING_PRETTY: bool = false;
        /// Compact single-line formatting for logs (ignored if TRACING_JSON=true)
        TRACING_COMPACT: bool = true;
        /// JSON formatting for logs
        TRACING_JSON: bool = false;
        /// If true, also log to file under <BYOK_HOME>/logs or LOG_DIR
        LOG_TO_FILE: bool = false;
        /// Optional explicit log directory (absolute). Defaults to <BYOK_HOME>/logs
        LOG_DIR: &str = "";
    }

    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_set = |k: &str| std::env::var_os(k).is_some();

    let mut filter = if !(*TRACING_FILTER).is_empty() {
        (*TRACING_FILTER).to_string()
    } else {
        (*RUST_LOG).to_string()
    };
    let mut tracing_json = *TRACING_JSON;
    let mut tracing_compact = *TRACING_COMPACT;
    let mut tracing_pretty = *TRACING_PRETTY;
    let mut log_to_file = *LOG_TO_FILE;
    let mut log_dir: Option<PathBuf> =
        (!(*LOG_DIR).is_empty()).then(|| PathBuf::from((*LOG_DIR).to_string()));

    if let Some(cfg) = user_cfg.and_then(|c| c.logging.as_ref()) {
        if !(env_set("TRACING_FILTER") || env_set("RUST_LOG"))
            && let Some(level) = cfg.level.as_ref()
        {
            filter = level.clone();
        }
        if !env_set("TRACING_JSON")
            && let Some(v) = cfg.json
        {
            tracing_json = v;
        }
        if !env_set("TRACING_COMPACT")
            && let Some(v) = cfg.compact
        {
            tracing_compact = v;
        }
        if !env_set("TRACING_PRETTY")
            && let Some(v) = cfg.pretty
        {
            tracing_pretty = v;
        }
        if !env_set("LOG_TO_FILE")
            && let Some(v) = cfg.to_file
        {
            log_to_file = v;
        }
        if !env_set("LOG_DIR")
            && let Some(dir) = cfg.dir.as_ref()
        {
            log_dir = Some(byok_wizard::config::expand_home(dir));
        }
    }

    let style = if tracing_json {
        LogStyle::Json
    } else if tracing_compact {
        LogStyle::Compact
    } else if tracing_pretty {
        LogStyle::Pretty
    } else {
        LogStyle::Full
    };
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    // Prompts own stdout; logs go to stderr.
    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(style, std::io::stderr, true)];

    static FILE_GUARD: OnceCell<tracing_appender::non_blocking::WorkerGuard> = OnceCell::new();
    if log_to_file {
        let dir = log_dir.unwrap_or_else(|| byok_home.join("logs"));
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, "byok-wizard.log");
                let (nb, guard) = tracing_appender::non_blocking(appender);
                let _ = FILE_GUARD.set(guard);
                layers.push(fmt_layer(style, nb, false));
            }
            Err(e) => eprintln!("failed to create log dir {}: {}", dir.display(), e),
        }
    }

    if let Err(e) = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
    {
        tracing::debug!("tracing already set: {:?}", e);
    }
}

async fn run_wizard(settings: &WizardSettings) -> anyhow::Result<Outcome> {
    let catalog = HttpCatalog::new(settings.fetch_timeout)?;
    let store = ConfigStore::new(StorePaths::new(
        settings.settings_path.clone(),
        settings.byok_home.clone(),
    ));
    let store = match KeyringSecretStore::detect() {
        Some(keyring) => store.with_secret_store(keyring),
        None => {
            tracing::info!("no OS credential store; API keys stay in providers.json");
            store
        }
    };
    let mut prompter = TerminalPrompter::stdio();

    println!("Add custom models to {}", settings.settings_path.display());
    Wizard::new(
        &catalog,
        &store,
        &mut prompter,
        settings.default_max_output_tokens,
    )
    .run()
    .await
}

#[tokio::main]
async fn main() -> ExitCode {
    env_flags! {
        /// Wizard home for saved providers, tracked models and logs. Defaults to $HOME/.byok-cli
        BYOK_HOME: &str = "";
        /// Host settings file that receives `customModels`.
        FACTORY_SETTINGS_PATH: &str = "~/.factory/settings.json";
        /// Timeout for the models listing request.
        BYOK_FETCH_TIMEOUT_SECS: u64 = 30;
        /// Default max output tokens offered for new models.
        BYOK_DEFAULT_MAX_TOKENS: u32 = 16384;
    }

    let cli = Cli::parse();

    let byok_home = resolve_byok_home(*BYOK_HOME);
    let user_cfg = load_user_config(&byok_home);
    init_tracing(&byok_home, user_cfg.as_ref().ok().and_then(Option::as_ref));
    let user_cfg = match user_cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("ignoring {}/config.toml: {}", byok_home.display(), e);
            None
        }
    };
    tracing::debug!("byok_home={}", byok_home.display());

    if let Command::Normalize { ids } = cli.command() {
        for id in ids {
            println!("{}", normalize_model_name(id));
        }
        return ExitCode::SUCCESS;
    }

    let env_set = |k: &str| std::env::var_os(k).is_some();
    let env = WizardEnv {
        settings_path: env_set("FACTORY_SETTINGS_PATH").then(|| (*FACTORY_SETTINGS_PATH).to_string()),
        fetch_timeout_secs: env_set("BYOK_FETCH_TIMEOUT_SECS").then_some(*BYOK_FETCH_TIMEOUT_SECS),
        default_max_output_tokens: env_set("BYOK_DEFAULT_MAX_TOKENS")
            .then_some(*BYOK_DEFAULT_MAX_TOKENS),
    };
    let settings = WizardSettings::resolve(byok_home, user_cfg.as_ref(), &env);
    tracing::info!(
        settings = %settings.settings_path.display(),
        timeout_secs = settings.fetch_timeout.as_secs(),
        "starting byok-wizard"
    );

    match run_wizard(&settings).await {
        Ok(Outcome::Saved { models, .. }) => {
            tracing::info!(count = models.len(), "wizard finished");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Declined) => ExitCode::SUCCESS,
        Err(e) if matches!(e.downcast_ref::<PromptError>(), Some(PromptError::Cancelled)) => {
            println!("Cancelled.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
