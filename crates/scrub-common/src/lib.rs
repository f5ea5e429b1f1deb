//! Shared types for projscrub.
//!
//! This crate provides the capability surface the sanitizer and exporter
//! consume from a host analysis environment:
//! - `Project`, `OptionNamespace`, `BookmarkManager` and `TaskMonitor` traits
//! - The fixed option `Namespace` names
//! - A JSON-backed project implementation (`JsonProject`)
//! - The `Prompter` trait for interactive choices
//! - Output format selection and host errors

pub mod document;
pub mod error;
pub mod host;
pub mod namespace;
pub mod output;
pub mod prompt;

pub use document::{BookmarkRecord, JsonProject, ProjectDocument, DOCUMENT_SCHEMA_VERSION};
pub use error::{HostError, Result};
pub use host::{Bookmark, BookmarkManager, OptionNamespace, Project, TaskMonitor, TracingMonitor};
pub use namespace::Namespace;
pub use output::OutputFormat;
pub use prompt::{PromptError, Prompter, ScriptedPrompter};
