use crate::catalog::ModelInfo;
use crate::model::{
    DEFAULT_MODELS_ENDPOINT, ProviderConfig, ProviderType, TrackedModel, UrlInput,
    validate_openai_compatible_url, validate_url,
};
use crate::naming::extract_provider_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Provider,
    ProviderDetail,
    Url,
    Title,
    Key,
    Fetching,
    Models,
    Settings,
    Confirm,
    Done,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Step::Provider => "provider",
            Step::ProviderDetail => "provider-detail",
            Step::Url => "url",
            Step::Title => "title",
            Step::Key => "key",
            Step::Fetching => "fetching",
            Step::Models => "models",
            Step::Settings => "settings",
            Step::Confirm => "confirm",
            Step::Done => "done",
        }
    }
}

/// Steps reachable by going back, in order. `Fetching` and `Done` are not.
const BACK_ORDER: [Step; 8] = [
    Step::Provider,
    Step::ProviderDetail,
    Step::Url,
    Step::Title,
    Step::Key,
    Step::Models,
    Step::Settings,
    Step::Confirm,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    AddModels,
    Edit,
    Back,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub step: Step,
    pub provider_name: String,
    pub base_url: String,
    pub provider_type: ProviderType,
    pub api_key: String,
    pub extracted_provider_name: String,
    pub display_title: String,
    pub models_endpoint: String,
    pub no_auth: bool,
    pub selected_models: Vec<String>,
    pub available_models: Vec<ModelInfo>,
    pub max_output_tokens: u32,
    pub supports_images: bool,
    pub error: Option<String>,
    pub saved_provider: Option<ProviderConfig>,
    pub existing_models: Vec<TrackedModel>,
}

impl WizardState {
    pub fn new(default_max_output_tokens: u32) -> Self {
        Self {
            step: Step::Provider,
            provider_name: String::new(),
            base_url: String::new(),
            provider_type: ProviderType::GenericChatCompletionApi,
            api_key: String::new(),
            extracted_provider_name: String::new(),
            display_title: String::new(),
            models_endpoint: DEFAULT_MODELS_ENDPOINT.to_string(),
            no_auth: false,
            selected_models: Vec::new(),
            available_models: Vec::new(),
            max_output_tokens: default_max_output_tokens,
            supports_images: false,
            error: None,
            saved_provider: None,
            existing_models: Vec::new(),
        }
    }

    /// Move to the previous step in [`BACK_ORDER`], clearing any error.
    ///
    /// The provider detail page only exists for saved providers; custom
    /// providers go straight back to provider selection.
    pub fn go_back(&mut self) {
        let Some(idx) = BACK_ORDER.iter().position(|s| *s == self.step) else {
            return;
        };
        if idx == 0 {
            return;
        }
        if self.step == Step::ProviderDetail {
            self.saved_provider = None;
            self.existing_models.clear();
        }
        let mut target = BACK_ORDER[idx - 1];
        if target == Step::ProviderDetail && self.saved_provider.is_none() {
            target = Step::Provider;
        }
        self.step = target;
        self.error = None;
    }

    pub fn select_saved_provider(&mut self, provider: ProviderConfig, existing: Vec<TrackedModel>) {
        self.provider_name = provider.name.clone();
        self.base_url = provider.base_url.clone();
        self.provider_type = provider.provider_type.clone();
        self.api_key = provider.api_key.clone().unwrap_or_default();
        self.display_title = provider.name.clone();
        self.extracted_provider_name = provider.name.clone();
        self.models_endpoint = provider.models_endpoint.clone();
        self.no_auth = provider.no_auth;
        self.existing_models = existing;
        self.saved_provider = Some(provider);
        self.step = Step::ProviderDetail;
    }

    pub fn select_custom(&mut self, provider_type: ProviderType) {
        self.provider_name = "Custom Provider".to_string();
        self.provider_type = provider_type;
        self.models_endpoint = DEFAULT_MODELS_ENDPOINT.to_string();
        self.no_auth = false;
        self.step = Step::Url;
    }

    pub fn detail_action(&mut self, action: DetailAction) {
        match action {
            DetailAction::Back => {
                self.saved_provider = None;
                self.existing_models.clear();
                self.step = Step::Provider;
            }
            DetailAction::AddModels => self.step = Step::Fetching,
            DetailAction::Edit => self.step = Step::Url,
        }
    }

    /// Validate the base URL; on success derive the default title.
    ///
    /// Chat-completions providers must point at a `/v1` path. `back` goes
    /// back a step. Failures leave the step unchanged and set `error`.
    pub fn submit_url(&mut self, input: &str) {
        let checked = if self.provider_type == ProviderType::GenericChatCompletionApi {
            validate_openai_compatible_url(input)
        } else {
            validate_url(input)
        };
        match checked {
            Ok(UrlInput::Back) => self.go_back(),
            Ok(UrlInput::Url(url)) => {
                let extracted = extract_provider_name(&url);
                self.base_url = url;
                self.extracted_provider_name = extracted.clone();
                self.display_title = extracted;
                self.error = None;
                self.step = Step::Title;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    /// Blank keeps the extracted name; anything URL-like is replaced by it.
    pub fn submit_title(&mut self, title: &str) {
        let title = title.trim();
        let chosen = if title.is_empty() {
            self.extracted_provider_name.clone()
        } else {
            title.to_string()
        };
        self.display_title = if chosen.contains("http") || chosen.contains('/') {
            self.extracted_provider_name.clone()
        } else {
            chosen
        };
        self.error = None;
        self.step = Step::Key;
    }

    pub fn submit_key(&mut self, key: &str) {
        if key.trim().eq_ignore_ascii_case("back") {
            self.go_back();
            return;
        }
        self.api_key = key.trim().to_string();
        self.error = None;
        self.step = Step::Fetching;
    }

    /// Whatever the outcome the wizard continues to model selection; an
    /// empty list means manual entry.
    pub fn models_fetched(&mut self, models: Vec<ModelInfo>) {
        self.available_models = models;
        self.error = None;
        self.step = Step::Models;
    }

    pub fn submit_models(&mut self, models: Vec<String>) {
        self.selected_models = models;
        self.error = None;
        self.step = Step::Settings;
    }

    pub fn submit_settings(&mut self, max_output_tokens: u32, supports_images: bool) {
        self.max_output_tokens = max_output_tokens;
        self.supports_images = supports_images;
        self.error = None;
        self.step = Step::Confirm;
    }

    pub fn finish(&mut self) {
        self.error = None;
        self.step = Step::Done;
    }

    /// Title for persisted display names; never a URL.
    pub fn safe_display_title(&self) -> String {
        if self.display_title.contains("http") || self.display_title.contains("://") {
            extract_provider_name(&self.base_url)
        } else {
            self.display_title.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at(step: Step) -> WizardState {
        let mut s = WizardState::new(16_384);
        s.step = step;
        s
    }

    #[test]
    fn back_follows_step_order_and_clears_error() {
        let cases = [
            (Step::ProviderDetail, Step::Provider),
            (Step::Url, Step::Provider),
            (Step::Title, Step::Url),
            (Step::Key, Step::Title),
            (Step::Models, Step::Key),
            (Step::Settings, Step::Models),
            (Step::Confirm, Step::Settings),
        ];
        for (from, to) in cases {
            let mut s = state_at(from);
            s.error = Some("boom".into());
            s.go_back();
            assert_eq!(s.step, to, "back from {}", from.as_str());
            assert_eq!(s.error, None);
        }
    }

    #[test]
    fn back_from_url_returns_to_saved_provider_detail() {
        let mut s = WizardState::new(16_384);
        let p = ProviderConfig::new("Acme", "https://api.acme.ai/v1", ProviderType::OpenAi);
        s.select_saved_provider(p, Vec::new());
        s.detail_action(DetailAction::Edit);
        s.go_back();
        assert_eq!(s.step, Step::ProviderDetail);
    }

    #[test]
    fn back_is_a_no_op_at_the_ends() {
        for step in [Step::Provider, Step::Fetching, Step::Done] {
            let mut s = state_at(step);
            s.go_back();
            assert_eq!(s.step, step);
        }
    }

    #[test]
    fn back_from_detail_forgets_saved_provider() {
        let mut s = WizardState::new(16_384);
        let p = ProviderConfig::new("Acme", "https://api.acme.ai/v1", ProviderType::Anthropic);
        s.select_saved_provider(p, Vec::new());
        assert_eq!(s.step, Step::ProviderDetail);
        assert_eq!(s.provider_type, ProviderType::Anthropic);
        assert_eq!(s.display_title, "Acme");
        s.go_back();
        assert_eq!(s.step, Step::Provider);
        assert!(s.saved_provider.is_none());
    }

    #[test]
    fn detail_actions() {
        let mut s = state_at(Step::ProviderDetail);
        s.detail_action(DetailAction::AddModels);
        assert_eq!(s.step, Step::Fetching);
        let mut s = state_at(Step::ProviderDetail);
        s.detail_action(DetailAction::Edit);
        assert_eq!(s.step, Step::Url);
        let mut s = state_at(Step::ProviderDetail);
        s.detail_action(DetailAction::Back);
        assert_eq!(s.step, Step::Provider);
    }

    #[test]
    fn generic_url_requires_v1_and_sets_title() {
        let mut s = WizardState::new(16_384);
        s.select_custom(ProviderType::GenericChatCompletionApi);
        s.submit_url("https://api.xreatlabs.space");
        assert_eq!(s.step, Step::Url);
        assert!(s.error.as_deref().unwrap().contains("/v1"));

        s.submit_url("https://api.xreatlabs.space/v1");
        assert_eq!(s.step, Step::Title);
        assert_eq!(s.error, None);
        assert_eq!(s.base_url, "https://api.xreatlabs.space/v1");
        assert_eq!(s.display_title, "Xreatlabs");
    }

    #[test]
    fn anthropic_url_skips_v1_check() {
        let mut s = WizardState::new(16_384);
        s.select_custom(ProviderType::Anthropic);
        s.submit_url("https://gateway.acme.ai");
        assert_eq!(s.step, Step::Title);
        assert_eq!(s.display_title, "Acme");
    }

    #[test]
    fn back_typed_at_url_and_key() {
        let mut s = WizardState::new(16_384);
        s.select_custom(ProviderType::OpenAi);
        s.submit_url("Back");
        assert_eq!(s.step, Step::Provider);

        let mut s = state_at(Step::Key);
        s.submit_key("back");
        assert_eq!(s.step, Step::Title);
    }

    #[test]
    fn url_like_titles_fall_back_to_extracted_name() {
        let mut s = state_at(Step::Title);
        s.extracted_provider_name = "Acme".into();
        s.submit_title("https://api.acme.ai");
        assert_eq!(s.display_title, "Acme");

        let mut s = state_at(Step::Title);
        s.extracted_provider_name = "Acme".into();
        s.submit_title("acme/prod");
        assert_eq!(s.display_title, "Acme");

        let mut s = state_at(Step::Title);
        s.extracted_provider_name = "Acme".into();
        s.submit_title("");
        assert_eq!(s.display_title, "Acme");
        assert_eq!(s.step, Step::Key);

        let mut s = state_at(Step::Title);
        s.submit_title("  Acme Prod ");
        assert_eq!(s.display_title, "Acme Prod");
    }

    #[test]
    fn safe_display_title_replaces_urls() {
        let mut s = state_at(Step::Confirm);
        s.base_url = "https://api.acme.ai/v1".into();
        s.display_title = "http://acme".into();
        assert_eq!(s.safe_display_title(), "Acme");
        s.display_title = "Acme Prod".into();
        assert_eq!(s.safe_display_title(), "Acme Prod");
    }

    #[test]
    fn forward_path() {
        let mut s = state_at(Step::Key);
        s.submit_key(" sk-test ");
        assert_eq!((s.step, s.api_key.as_str()), (Step::Fetching, "sk-test"));
        s.models_fetched(Vec::new());
        assert_eq!(s.step, Step::Models);
        s.submit_models(vec!["m1".into()]);
        assert_eq!(s.step, Step::Settings);
        s.submit_settings(4096, true);
        assert_eq!((s.step, s.max_output_tokens, s.supports_images), (Step::Confirm, 4096, true));
        s.finish();
        assert_eq!(s.step, Step::Done);
    }
}
