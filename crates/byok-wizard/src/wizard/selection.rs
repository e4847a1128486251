use crate::catalog::{ModelInfo, format_choice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

/// Multi-pick over fetched models with search, bulk select and undo.
#[derive(Debug, Clone, Default)]
pub struct ModelSelection {
    choices: Vec<Choice>,
    selected: Vec<String>,
}

impl ModelSelection {
    pub fn new(models: &[ModelInfo]) -> Self {
        let choices = models
            .iter()
            .map(|m| Choice {
                label: format_choice(m),
                value: m.id.clone(),
            })
            .collect();
        Self {
            choices,
            selected: Vec::new(),
        }
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Choices not yet selected whose label contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<&Choice> {
        let term = term.to_lowercase();
        self.choices
            .iter()
            .filter(|c| !self.selected.contains(&c.value))
            .filter(|c| c.label.to_lowercase().contains(&term))
            .collect()
    }

    /// Select every current match of `term`; returns what was added.
    pub fn select_all_matching(&mut self, term: &str) -> Vec<String> {
        let added: Vec<String> = self
            .search(term)
            .into_iter()
            .map(|c| c.value.clone())
            .collect();
        self.selected.extend(added.iter().cloned());
        added
    }

    /// Returns false when `value` was already selected.
    pub fn add(&mut self, value: &str) -> bool {
        if self.selected.iter().any(|s| s == value) {
            return false;
        }
        self.selected.push(value.to_string());
        true
    }

    pub fn undo(&mut self) -> Option<String> {
        self.selected.pop()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn into_selected(self) -> Vec<String> {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<ModelInfo> {
        ["llama-3.1-8b", "llama-3.1-70b", "qwen2.5-coder-32b", "gpt-4o"]
            .iter()
            .map(|id| ModelInfo {
                id: id.to_string(),
                name: id.to_string(),
                owned_by: (if id.starts_with("gpt") { "openai" } else { "meta" }).to_string(),
            })
            .collect()
    }

    #[test]
    fn search_matches_labels_case_insensitively() {
        let sel = ModelSelection::new(&models());
        let hits: Vec<_> = sel.search("LLAMA").iter().map(|c| c.value.as_str()).collect();
        assert_eq!(hits, vec!["llama-3.1-8b", "llama-3.1-70b"]);
        // owner is part of the label
        assert_eq!(sel.search("openai").len(), 1);
        assert_eq!(sel.search("").len(), 4);
    }

    #[test]
    fn selected_models_leave_the_search() {
        let mut sel = ModelSelection::new(&models());
        assert!(sel.add("gpt-4o"));
        assert!(!sel.add("gpt-4o"));
        assert_eq!(sel.search("").len(), 3);
    }

    #[test]
    fn select_all_then_undo_and_clear() {
        let mut sel = ModelSelection::new(&models());
        sel.add("qwen2.5-coder-32b");
        let added = sel.select_all_matching("llama");
        assert_eq!(added, vec!["llama-3.1-8b", "llama-3.1-70b"]);
        assert_eq!(sel.selected().len(), 3);
        assert_eq!(sel.undo().as_deref(), Some("llama-3.1-70b"));
        assert_eq!(sel.selected().len(), 2);
        sel.clear();
        assert!(sel.selected().is_empty());
        assert_eq!(sel.undo(), None);
    }

    #[test]
    fn select_all_skips_already_selected() {
        let mut sel = ModelSelection::new(&models());
        sel.add("llama-3.1-8b");
        assert_eq!(sel.select_all_matching("llama"), vec!["llama-3.1-70b"]);
        assert_eq!(sel.into_selected(), vec!["llama-3.1-8b", "llama-3.1-70b"]);
    }
}
