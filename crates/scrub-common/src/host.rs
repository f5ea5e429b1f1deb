//! Host environment capability surface.
//!
//! The sanitizer and exporter never reach into a host's object model
//! directly. They work through these traits, and every operation receives
//! the project explicitly.

use crate::{Namespace, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A bookmark, identified by its category and an id unique within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bookmark {
    pub category: String,
    pub id: u64,
}

impl Bookmark {
    pub fn new(category: impl Into<String>, id: u64) -> Self {
        Self {
            category: category.into(),
            id,
        }
    }
}

/// Progress handle passed to long-running host enumerations.
pub trait TaskMonitor {
    /// Report what the host is currently doing.
    fn set_message(&self, message: &str);
}

/// Monitor that forwards progress messages to `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMonitor;

impl TaskMonitor for TracingMonitor {
    fn set_message(&self, message: &str) {
        tracing::debug!(target: "scrub::monitor", "{}", message);
    }
}

/// A mutable key/value namespace attached to a project.
pub trait OptionNamespace {
    /// Whether the namespace holds `key`.
    fn contains(&self, key: &str) -> bool;

    /// All option names currently present.
    fn list_keys(&self) -> Vec<String>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Access to a project's bookmark set.
pub trait BookmarkManager {
    /// Every category, including empty ones.
    fn list_categories(&self, monitor: &dyn TaskMonitor) -> Result<Vec<String>>;

    /// Bookmarks currently stored in `category`.
    fn list_bookmarks(&self, category: &str) -> Result<Vec<Bookmark>>;

    /// Remove a single bookmark.
    fn remove(&mut self, bookmark: &Bookmark) -> Result<()>;
}

/// An opened analysis project.
pub trait Project {
    /// Immutable project name derived from the backing store.
    fn name(&self) -> &str;

    /// Path of the on-disk backing store file.
    fn backing_location(&self) -> &Path;

    /// The directory holding the backing store.
    fn project_dir(&self) -> Option<&Path> {
        self.backing_location().parent()
    }

    fn executable_path(&self) -> &str;

    fn executable_format(&self) -> &str;

    fn set_executable_path(&mut self, path: &str);

    fn set_executable_format(&mut self, format: &str);

    /// Open one option namespace for reading and mutation.
    fn options(&mut self, namespace: Namespace) -> Result<Box<dyn OptionNamespace + '_>>;

    /// The bookmark manager, if the host exposes one.
    fn bookmarks(&mut self) -> Option<Box<dyn BookmarkManager + '_>>;

    /// Write in-memory changes back to the backing store.
    fn persist(&mut self) -> Result<()>;

    /// Whether there are in-memory changes not yet persisted.
    fn is_dirty(&self) -> bool;
}
