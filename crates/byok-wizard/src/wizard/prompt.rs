//! Line-oriented terminal prompts behind a trait so the driver can be scripted.

use std::io::{self, BufRead, Write};

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("cancelled")]
    Cancelled,
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}

pub trait Prompter {
    /// Free text; blank input yields `default` when one is given.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, PromptError>;

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError>;

    /// Index into `choices`.
    fn select(&mut self, message: &str, choices: &[String]) -> Result<usize, PromptError>;

    fn say(&mut self, line: &str) -> Result<(), PromptError>;
}

/// Reads answers line by line; end of input cancels the wizard.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Result<String, PromptError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Cancelled);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn ask(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "? {prompt} ")?;
        self.output.flush()?;
        self.read_line()
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String, PromptError> {
        let prompt = match default {
            Some(d) if !d.is_empty() => format!("{message} ({d})"),
            _ => message.to_string(),
        };
        let answer = self.ask(&prompt)?;
        match default {
            Some(d) if answer.trim().is_empty() => Ok(d.to_string()),
            _ => Ok(answer),
        }
    }

    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, PromptError> {
        let hint = if default { "(Y/n)" } else { "(y/N)" };
        loop {
            let answer = self.ask(&format!("{message} {hint}"))?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "  Please answer y or n.")?,
            }
        }
    }

    fn select(&mut self, message: &str, choices: &[String]) -> Result<usize, PromptError> {
        if choices.is_empty() {
            return Err(PromptError::Cancelled);
        }
        writeln!(self.output, "? {message}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {:>2}) {choice}", i + 1)?;
        }
        loop {
            let answer = self.ask(&format!("Choose 1-{}:", choices.len()))?;
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.output, "  Enter a number from the list.")?,
            }
        }
    }

    fn say(&mut self, line: &str) -> Result<(), PromptError> {
        writeln!(self.output, "{line}")?;
        Ok(())
    }
}
