//! Interactive prompts.
//!
//! Prompts are an external collaborator: the pipeline only needs a
//! directory chooser and a yes/no question. `None` from `choose_directory`
//! means the user made no selection, which callers treat as a normal exit.

use std::collections::VecDeque;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a prompter.
#[derive(Error, Debug)]
pub enum PromptError {
    /// Interactive input is not possible (no terminal, no scripted answer).
    #[error("prompt unavailable: {0}")]
    Unavailable(String),

    /// The prompt backend failed.
    #[error("prompt failed: {0}")]
    Interaction(String),
}

/// Source of interactive answers.
pub trait Prompter {
    /// Ask the user to pick a directory.
    fn choose_directory(&mut self, prompt: &str) -> Result<Option<PathBuf>, PromptError>;

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str) -> Result<bool, PromptError>;
}

/// Prompter that replays pre-recorded answers in order.
///
/// Used for non-interactive runs (answers come from CLI flags) and tests.
/// Asking more questions than were recorded yields `PromptError::Unavailable`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    directories: VecDeque<Option<PathBuf>>,
    confirmations: VecDeque<bool>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next directory prompt.
    pub fn with_directory(mut self, answer: Option<PathBuf>) -> Self {
        self.directories.push_back(answer);
        self
    }

    /// Queue an answer for the next yes/no prompt.
    pub fn with_confirmation(mut self, answer: bool) -> Self {
        self.confirmations.push_back(answer);
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn choose_directory(&mut self, prompt: &str) -> Result<Option<PathBuf>, PromptError> {
        self.directories
            .pop_front()
            .ok_or_else(|| PromptError::Unavailable(format!("no answer for '{}'", prompt)))
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, PromptError> {
        self.confirmations
            .pop_front()
            .ok_or_else(|| PromptError::Unavailable(format!("no answer for '{}'", prompt)))
    }
}
