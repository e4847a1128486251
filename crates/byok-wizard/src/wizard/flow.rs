//! The interactive driver: walks [`WizardState`] through its steps, asking
//! the [`Prompter`] for input and persisting the result through the store.

use std::path::PathBuf;

use anyhow::Context;

use super::advanced::{
    AdvancedSettings, SamplingField, parse_custom_args, parse_headers, parse_stop_sequences,
};
use super::prompt::{PromptError, Prompter};
use super::selection::ModelSelection;
use super::state::{DetailAction, Step, WizardState};
use crate::catalog::{FetchRequest, ModelCatalog, fetch_with_fallback};
use crate::model::{
    MAX_OUTPUT_TOKENS_LIMIT, ModelConfig, ModelOptions, ProviderConfig, ProviderType,
    TrackedModel, generate_model_config,
};
use crate::naming::normalize_model_name;
use crate::redact::{mask_secret, masked_configs};
use crate::store::ConfigStore;

const CUSTOM_PROVIDER_CHOICE: &str = "Custom provider";
const SEARCH_PAGE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved {
        models: Vec<String>,
        settings_path: PathBuf,
    },
    Declined,
}

pub struct Wizard<'a> {
    catalog: &'a dyn ModelCatalog,
    store: &'a ConfigStore,
    prompter: &'a mut dyn Prompter,
    state: WizardState,
    advanced: AdvancedSettings,
}

impl<'a> Wizard<'a> {
    pub fn new(
        catalog: &'a dyn ModelCatalog,
        store: &'a ConfigStore,
        prompter: &'a mut dyn Prompter,
        default_max_output_tokens: u32,
    ) -> Self {
        Self {
            catalog,
            store,
            prompter,
            state: WizardState::new(default_max_output_tokens),
            advanced: AdvancedSettings::default(),
        }
    }

    /// Run until the user saves or declines. Cancelling surfaces as
    /// [`PromptError::Cancelled`] inside the returned error.
    pub async fn run(mut self) -> anyhow::Result<Outcome> {
        let mut outcome = Outcome::Declined;
        while self.state.step != Step::Done {
            tracing::debug!(step = self.state.step.as_str(), "wizard step");
            match self.state.step {
                Step::Provider => self.provider_step()?,
                Step::ProviderDetail => self.detail_step()?,
                Step::Url => self.url_step()?,
                Step::Title => self.title_step()?,
                Step::Key => self.key_step()?,
                Step::Fetching => self.fetch_step().await?,
                Step::Models => self.models_step()?,
                Step::Settings => self.settings_step()?,
                Step::Confirm => outcome = self.confirm_step().await?,
                Step::Done => {}
            }
        }
        Ok(outcome)
    }

    fn provider_step(&mut self) -> anyhow::Result<()> {
        let saved = self
            .store
            .read_saved_providers()
            .context("failed to read saved providers")?;
        let mut choices: Vec<String> = saved.iter().map(|p| format!("{} (saved)", p.name)).collect();
        choices.push(CUSTOM_PROVIDER_CHOICE.to_string());

        let idx = self.prompter.select("Select a provider:", &choices)?;
        if let Some(provider) = saved.into_iter().nth(idx) {
            let existing = self
                .store
                .tracked_models_by_provider(&provider.base_url)
                .context("failed to read tracked models")?;
            tracing::info!(provider = %provider.name, existing = existing.len(), "selected saved provider");
            self.state.select_saved_provider(provider, existing);
            return Ok(());
        }

        let labels: Vec<String> = ProviderType::CHOICES.iter().map(|t| t.label()).collect();
        let idx = self.prompter.select("Select the API compatibility:", &labels)?;
        let provider_type = ProviderType::CHOICES[idx].clone();
        tracing::info!(provider_type = %provider_type, "custom provider");
        self.state.select_custom(provider_type);
        Ok(())
    }

    fn detail_step(&mut self) -> anyhow::Result<()> {
        self.prompter
            .say(&format!("{} ({})", self.state.provider_name, self.state.base_url))?;
        self.prompter.say(&format!("  API: {}", self.state.provider_type.label()))?;
        if self.state.existing_models.is_empty() {
            self.prompter.say("  No models added yet.")?;
        } else {
            self.prompter.say("  Models:")?;
            for m in &self.state.existing_models {
                self.prompter
                    .say(&format!("    - {} ({})", m.display_name, m.model_id))?;
            }
        }

        let actions = [
            ("Add models", DetailAction::AddModels),
            ("Edit provider", DetailAction::Edit),
            ("Back", DetailAction::Back),
        ];
        let labels: Vec<String> = actions.iter().map(|(l, _)| l.to_string()).collect();
        let idx = self.prompter.select("What would you like to do?", &labels)?;
        self.state.detail_action(actions[idx].1);
        Ok(())
    }

    fn url_step(&mut self) -> anyhow::Result<()> {
        let current = self.state.base_url.clone();
        let answer = self.prompter.input(
            "Enter the base URL (or \"back\" to go back):",
            (!current.is_empty()).then_some(current.as_str()),
        )?;
        self.state.submit_url(&answer);
        self.report_error()
    }

    fn title_step(&mut self) -> anyhow::Result<()> {
        let extracted = self.state.extracted_provider_name.clone();
        let answer = self
            .prompter
            .input("Display name for this provider:", Some(&extracted))?;
        self.state.submit_title(&answer);
        Ok(())
    }

    fn key_step(&mut self) -> anyhow::Result<()> {
        let editing = self.state.saved_provider.is_some() && !self.state.api_key.is_empty();
        let message = if editing {
            "Enter your API key (or \"back\" to go back, blank keeps the saved key):"
        } else {
            "Enter your API key (or \"back\" to go back):"
        };
        let answer = self.prompter.input(message, None)?;
        if editing && answer.trim().is_empty() {
            let kept = self.state.api_key.clone();
            self.state.submit_key(&kept);
        } else {
            self.state.submit_key(&answer);
        }
        Ok(())
    }

    async fn fetch_step(&mut self) -> anyhow::Result<()> {
        self.prompter.say("Fetching available models...")?;
        let request = FetchRequest {
            base_url: self.state.base_url.clone(),
            api_key: self.state.api_key.clone(),
            models_endpoint: Some(self.state.models_endpoint.clone()),
            no_auth: self.state.no_auth,
            provider_type: self.state.provider_type.clone(),
        };
        tracing::debug!(
            base_url = %request.base_url,
            key = %mask_secret(&request.api_key),
            "fetching models"
        );

        let models = match fetch_with_fallback(self.catalog, &request).await {
            Ok(models) => {
                if models.is_empty() {
                    self.prompter
                        .say("No models returned; enter model IDs manually.")?;
                } else {
                    self.prompter.say(&format!("Found {} models.", models.len()))?;
                }
                models
            }
            Err(e) => {
                tracing::warn!(base_url = %request.base_url, "model fetch failed: {}", e);
                self.prompter.say(&format!("Failed to fetch models: {e}"))?;
                Vec::new()
            }
        };
        self.state.models_fetched(models);
        Ok(())
    }

    fn models_step(&mut self) -> anyhow::Result<()> {
        if self.state.available_models.is_empty() {
            return self.manual_entry();
        }

        let modes = [
            "Search and select (type to filter)",
            "Browse full list (checkbox)",
            "Enter model ID manually",
            "Back",
        ]
        .map(String::from);
        match self.prompter.select("How would you like to select models?", &modes)? {
            0 => self.search_models(),
            1 => self.browse_models(),
            2 => self.manual_entry(),
            _ => {
                self.state.go_back();
                Ok(())
            }
        }
    }

    fn manual_entry(&mut self) -> anyhow::Result<()> {
        loop {
            let answer = self.prompter.input("Enter the model ID:", None)?;
            let id = answer.trim();
            if id.eq_ignore_ascii_case("back") {
                self.state.go_back();
                return Ok(());
            }
            if id.is_empty() {
                self.prompter.say("Model ID is required")?;
                continue;
            }
            self.state.submit_models(vec![id.to_string()]);
            return Ok(());
        }
    }

    fn search_models(&mut self) -> anyhow::Result<()> {
        let mut selection = ModelSelection::new(&self.state.available_models);
        loop {
            let term = self
                .prompter
                .input("Search models (blank lists everything):", None)?;
            let term = term.trim().to_string();
            let hits: Vec<(String, String)> = selection
                .search(&term)
                .into_iter()
                .map(|c| (c.label.clone(), c.value.clone()))
                .collect();

            if hits.is_empty() {
                self.prompter.say(&format!("No models match \"{term}\"."))?;
            } else {
                let bulk = !term.is_empty() && hits.len() > 1;
                let mut choices = Vec::new();
                if bulk {
                    choices.push(format!("★ Select all \"{term}\" matches ({})", hits.len()));
                }
                choices.extend(hits.iter().take(SEARCH_PAGE).map(|(label, _)| label.clone()));
                if hits.len() > SEARCH_PAGE {
                    self.prompter.say(&format!(
                        "Showing {SEARCH_PAGE} of {} matches; refine the search to see more.",
                        hits.len()
                    ))?;
                }
                choices.push("Cancel search".to_string());

                let shown = hits.len().min(SEARCH_PAGE);
                let idx = self.prompter.select("Select a model:", &choices)?;
                match idx.checked_sub(usize::from(bulk)) {
                    None => {
                        let added = selection.select_all_matching(&term);
                        self.prompter.say(&format!("Added {} model(s).", added.len()))?;
                    }
                    Some(i) if i < shown => {
                        selection.add(&hits[i].1);
                    }
                    Some(_) => {}
                }
            }

            self.prompter
                .say(&format!("Selected: {} model(s)", selection.selected().len()))?;
            let next = [
                "Add more models",
                "Done selecting",
                "Remove last selection",
                "Clear all selections",
            ]
            .map(String::from);
            match self.prompter.select("Next:", &next)? {
                1 if selection.selected().is_empty() => {
                    self.prompter.say("Select at least one model.")?;
                }
                1 => break,
                2 => {
                    if let Some(removed) = selection.undo() {
                        self.prompter.say(&format!("Removed {removed}"))?;
                    }
                }
                3 => selection.clear(),
                _ => {}
            }
        }
        self.state.submit_models(selection.into_selected());
        Ok(())
    }

    fn browse_models(&mut self) -> anyhow::Result<()> {
        let selection = ModelSelection::new(&self.state.available_models);
        for (i, choice) in selection.choices().iter().enumerate() {
            self.prompter.say(&format!("  {:>3}) {}", i + 1, choice.label))?;
        }
        let count = selection.choices().len();
        let picked = self.ask_until("Select models by number, comma-separated (e.g. 1,3,5):", |s| {
            parse_picks(s, count)
        })?;
        let models = picked
            .into_iter()
            .map(|i| selection.choices()[i].value.clone())
            .collect();
        self.state.submit_models(models);
        Ok(())
    }

    fn settings_step(&mut self) -> anyhow::Result<()> {
        let default = self.state.max_output_tokens.to_string();
        let max_output_tokens = loop {
            let answer = self.prompter.input(
                "Max output tokens (applies to all selected models):",
                Some(&default),
            )?;
            match answer.trim().parse::<u32>() {
                Ok(n) if (1..=MAX_OUTPUT_TOKENS_LIMIT).contains(&n) => break n,
                _ => self.prompter.say(&format!(
                    "Must be a positive integer no greater than {MAX_OUTPUT_TOKENS_LIMIT}"
                ))?,
            }
        };
        let supports_images = self
            .prompter
            .confirm("Do these models support image inputs?", false)?;

        self.advanced = AdvancedSettings::default();
        if self.prompter.confirm(
            "Configure advanced settings (temperature, top_p, headers, etc.)?",
            false,
        )? {
            self.advanced = self.advanced_settings()?;
        }
        self.state.submit_settings(max_output_tokens, supports_images);
        Ok(())
    }

    fn advanced_settings(&mut self) -> Result<AdvancedSettings, PromptError> {
        let mut adv = AdvancedSettings::default();
        for field in SamplingField::ALL {
            let message = format!("{} (blank to skip)", field.prompt());
            if let Some(value) = self.ask_until(&message, |s| field.parse(s))? {
                adv.set(field.key(), value);
            }
        }

        let stops = self
            .prompter
            .input("Stop sequences, comma-separated (blank to skip):", None)?;
        if let Some(stop) = parse_stop_sequences(&stops) {
            adv.set("stop", stop);
        }
        if let Some(custom) =
            self.ask_until("Custom extraArgs as JSON (blank to skip):", parse_custom_args)?
        {
            adv.merge_custom(custom);
        }
        if let Some(headers) =
            self.ask_until("Extra headers as JSON (blank to skip):", parse_headers)?
        {
            adv.extra_headers = headers;
        }
        Ok(adv)
    }

    async fn confirm_step(&mut self) -> anyhow::Result<Outcome> {
        let configs = self.build_configs()?;
        let title = self.state.safe_display_title();
        self.prompter
            .say(&format!("Provider: {title} ({})", self.state.base_url))?;
        for c in &configs {
            self.prompter.say(&format!("  - {} ({})", c.display_name, c.model))?;
        }

        let settings_path = self.store.settings_path().to_path_buf();
        let question = format!(
            "Add {} model(s) to {}?",
            configs.len(),
            settings_path.display()
        );
        if !self.prompter.confirm(&question, true)? {
            let preview = serde_json::to_string_pretty(&masked_configs(&configs))?;
            self.prompter.say("Configuration not saved.")?;
            self.prompter.say(&preview)?;
            self.prompter
                .say("You can manually add the above JSON to your settings.json file.")?;
            self.state.finish();
            return Ok(Outcome::Declined);
        }

        for c in &configs {
            self.store
                .add_model_to_settings(c)
                .await
                .with_context(|| format!("failed to add {} to settings", c.model))?;
            self.store
                .track_model(TrackedModel {
                    model_id: c.model.clone(),
                    provider_name: title.clone(),
                    base_url: c.base_url.clone(),
                    display_name: c.display_name.clone(),
                    max_output_tokens: c.max_output_tokens,
                    supports_images: c.supports_images.unwrap_or(false),
                    provider: c.provider.clone(),
                    added_at: String::new(),
                })
                .await
                .with_context(|| format!("failed to record {}", c.model))?;
        }

        let provider = ProviderConfig {
            name: title,
            base_url: self.state.base_url.clone(),
            provider_type: self.state.provider_type.clone(),
            models_endpoint: self.state.models_endpoint.clone(),
            no_auth: self.state.no_auth,
            api_key: (!self.state.api_key.is_empty()).then(|| self.state.api_key.clone()),
        };
        self.store
            .save_provider(&provider)
            .await
            .context("failed to save provider")?;

        tracing::info!(
            provider = %provider.name,
            models = configs.len(),
            path = %settings_path.display(),
            "saved models"
        );
        self.prompter.say(&format!(
            "✔ Added {} model(s) to {}",
            configs.len(),
            settings_path.display()
        ))?;
        self.state.finish();
        Ok(Outcome::Saved {
            models: configs.into_iter().map(|c| c.model).collect(),
            settings_path,
        })
    }

    fn build_configs(&self) -> anyhow::Result<Vec<ModelConfig>> {
        let title = self.state.safe_display_title();
        let api_key = (!self.state.no_auth).then(|| self.state.api_key.clone());
        self.state
            .selected_models
            .iter()
            .map(|id| {
                generate_model_config(ModelOptions {
                    model: id.clone(),
                    display_name: format!("{} [{title}]", normalize_model_name(id)),
                    base_url: self.state.base_url.clone(),
                    api_key: api_key.clone(),
                    provider: self.state.provider_type.clone(),
                    max_output_tokens: Some(self.state.max_output_tokens),
                    supports_images: self.state.supports_images,
                    extra_args: self.advanced.extra_args(),
                    extra_headers: self.advanced.extra_headers(),
                })
                .with_context(|| format!("invalid configuration for {id}"))
            })
            .collect()
    }

    fn report_error(&mut self) -> anyhow::Result<()> {
        if let Some(e) = self.state.error.clone() {
            self.prompter.say(&format!("✖ {e}"))?;
        }
        Ok(())
    }

    /// Re-ask `message` until `parse` accepts the answer.
    fn ask_until<T>(
        &mut self,
        message: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Result<T, PromptError> {
        loop {
            let answer = self.prompter.input(message, None)?;
            match parse(&answer) {
                Ok(v) => return Ok(v),
                Err(msg) => self.prompter.say(&format!("✖ {msg}"))?,
            }
        }
    }
}

/// 1-based, comma-separated picks into 0-based indices, duplicates dropped.
fn parse_picks(input: &str, count: usize) -> Result<Vec<usize>, String> {
    let mut picks = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => {
                if !picks.contains(&(n - 1)) {
                    picks.push(n - 1);
                }
            }
            _ => return Err(format!("Invalid selection: {part}")),
        }
    }
    if picks.is_empty() {
        return Err("Select at least one model.".to_string());
    }
    Ok(picks)
}
