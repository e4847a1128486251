//! Interactive setup: pick a provider, choose models, save them.

pub mod advanced;
pub mod flow;
pub mod prompt;
pub mod selection;
pub mod state;

pub use advanced::AdvancedSettings;
pub use flow::{Outcome, Wizard};
pub use prompt::{PromptError, Prompter, TerminalPrompter};
pub use selection::{Choice, ModelSelection};
pub use state::{DetailAction, Step, WizardState};
