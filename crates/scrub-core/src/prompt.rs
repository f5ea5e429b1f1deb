//! Prompters used by the CLI.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use scrub_bundle::{INCLUDE_SCRIPTS_PROMPT, SCRIPT_DIRECTORY_PROMPT};
use scrub_common::{PromptError, Prompter};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Fail unless stdin and stderr are attached to a terminal.
pub fn require_terminal() -> Result<(), PromptError> {
    if !std::io::stdin().is_terminal() {
        return Err(PromptError::Unavailable(
            "stdin is not a terminal".to_string(),
        ));
    }
    if !std::io::stderr().is_terminal() {
        return Err(PromptError::Unavailable(
            "stderr is not a terminal".to_string(),
        ));
    }
    Ok(())
}

/// Interactive prompter on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    /// Create a terminal prompter; fails when no terminal is attached.
    pub fn new() -> Result<Self, PromptError> {
        require_terminal()?;
        Ok(Self {
            theme: ColorfulTheme::default(),
        })
    }
}

impl Prompter for TerminalPrompter {
    fn choose_directory(&mut self, prompt: &str) -> Result<Option<PathBuf>, PromptError> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(format!("{} (empty to cancel)", prompt))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PromptError::Interaction(e.to_string()))?;
        let answer = answer.trim();
        if answer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(answer)))
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, PromptError> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| PromptError::Interaction(e.to_string()))
    }
}

/// Answers the script prompts from CLI flags and defers the rest.
///
/// Questions without a preset answer go to the fallback prompter; without a
/// fallback they fail with `PromptError::Unavailable`.
#[derive(Default)]
pub struct PresetPrompter {
    include_scripts: Option<bool>,
    script_directory: Option<PathBuf>,
    fallback: Option<Box<dyn Prompter>>,
}

impl PresetPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset the script answers: `Some(dir)` includes `dir`, `None` declines.
    pub fn with_scripts(mut self, directory: Option<PathBuf>) -> Self {
        self.include_scripts = Some(directory.is_some());
        self.script_directory = directory;
        self
    }

    pub fn with_fallback(mut self, fallback: Box<dyn Prompter>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    fn fallback(&mut self, prompt: &str) -> Result<&mut dyn Prompter, PromptError> {
        match self.fallback.as_deref_mut() {
            Some(prompter) => Ok(prompter),
            None => Err(PromptError::Unavailable(format!(
                "no answer for '{}' in non-interactive mode",
                prompt
            ))),
        }
    }
}

impl Prompter for PresetPrompter {
    fn choose_directory(&mut self, prompt: &str) -> Result<Option<PathBuf>, PromptError> {
        if prompt == SCRIPT_DIRECTORY_PROMPT {
            if let Some(dir) = self.script_directory.take() {
                return Ok(Some(dir));
            }
        }
        self.fallback(prompt)?.choose_directory(prompt)
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, PromptError> {
        if prompt == INCLUDE_SCRIPTS_PROMPT {
            if let Some(answer) = self.include_scripts {
                return Ok(answer);
            }
        }
        self.fallback(prompt)?.confirm(prompt)
    }
}
