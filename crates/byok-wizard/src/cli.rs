//! Command-line surface.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "byok-wizard",
    version,
    about = "Add bring-your-own-key models to the host settings file"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Add custom models from a provider (default)
    #[command(visible_alias = "interactive")]
    Add,
    /// Print the display name for each model id
    Normalize {
        #[arg(required = true, num_args = 1.., value_name = "ID")]
        ids: Vec<String>,
    },
}

static DEFAULT_COMMAND: Command = Command::Add;

impl Cli {
    /// Running with no subcommand starts the wizard.
    pub fn command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&DEFAULT_COMMAND)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("byok-wizard").chain(args.iter().copied()))
    }

    #[test]
    fn bare_invocation_runs_the_wizard() {
        assert_eq!(parse(&[]).unwrap().command(), &Command::Add);
        assert_eq!(parse(&["interactive"]).unwrap().command(), &Command::Add);
    }

    #[test]
    fn normalize_takes_ids() {
        let cli = parse(&["normalize", "gpt-4o", "claude-3-opus"]).unwrap();
        assert_eq!(
            cli.command(),
            &Command::Normalize {
                ids: vec!["gpt-4o".into(), "claude-3-opus".into()]
            }
        );
    }

    #[test]
    fn help_after_subcommand_is_not_a_model_id() {
        let err = parse(&["normalize", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn normalize_without_ids_is_rejected() {
        let err = parse(&["normalize"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn unknown_flags_and_commands_are_rejected() {
        assert_eq!(
            parse(&["add", "--bogus-flag"]).unwrap_err().kind(),
            ErrorKind::UnknownArgument
        );
        assert_eq!(
            parse(&["frobnicate"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
    }

    #[test]
    fn version_flag() {
        assert_eq!(parse(&["-V"]).unwrap_err().kind(), ErrorKind::DisplayVersion);
    }
}
