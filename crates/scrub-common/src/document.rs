//! JSON-backed project store.
//!
//! `ProjectDocument` is the on-disk shape of a project's metadata and
//! `JsonProject` exposes it through the host capability traits, tracking
//! unsaved changes so callers can tell whether the backing store is current.

use crate::host::{Bookmark, BookmarkManager, OptionNamespace, Project, TaskMonitor};
use crate::{HostError, Namespace, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Current project document schema version.
pub const DOCUMENT_SCHEMA_VERSION: &str = "1.0.0";

/// A single bookmark as stored in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    /// Identity within the category.
    pub id: u64,

    /// Location in the analyzed binary.
    pub address: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// Serialized project metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Explicit project name; the backing file stem is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub executable_path: String,

    #[serde(default)]
    pub executable_format: String,

    /// Namespace name -> option name -> opaque value.
    #[serde(default)]
    pub options: BTreeMap<String, BTreeMap<String, Value>>,

    /// Category -> bookmarks.
    #[serde(default)]
    pub bookmarks: BTreeMap<String, Vec<BookmarkRecord>>,
}

fn default_schema_version() -> String {
    DOCUMENT_SCHEMA_VERSION.to_string()
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            name: None,
            executable_path: String::new(),
            executable_format: String::new(),
            options: BTreeMap::new(),
            bookmarks: BTreeMap::new(),
        }
    }
}

impl ProjectDocument {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to JSON with consistent formatting.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Options stored in `namespace`, if the namespace exists.
    pub fn namespace(&self, namespace: Namespace) -> Option<&BTreeMap<String, Value>> {
        self.options.get(namespace.as_str())
    }

    /// Look up a single option value.
    pub fn option(&self, namespace: Namespace, key: &str) -> Option<&Value> {
        self.namespace(namespace).and_then(|entries| entries.get(key))
    }

    /// Set an option value, creating the namespace if needed.
    pub fn set_option(&mut self, namespace: Namespace, key: impl Into<String>, value: Value) {
        self.options
            .entry(namespace.as_str().to_string())
            .or_default()
            .insert(key.into(), value);
    }

    /// Append a bookmark to `category`.
    pub fn add_bookmark(&mut self, category: impl Into<String>, record: BookmarkRecord) {
        self.bookmarks.entry(category.into()).or_default().push(record);
    }

    /// Total bookmarks across all categories.
    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.values().map(Vec::len).sum()
    }
}

/// A project whose backing store is a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonProject {
    path: PathBuf,
    name: String,
    doc: ProjectDocument,
    dirty: bool,
}

impl JsonProject {
    /// Open the project stored at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => HostError::ProjectNotFound { path: path.clone() },
            _ => HostError::Io {
                path: path.clone(),
                source: e,
            },
        })?;

        let doc = ProjectDocument::from_json(&content).map_err(|e| HostError::Parse {
            path: path.clone(),
            source: e,
        })?;

        if doc.schema_version != DOCUMENT_SCHEMA_VERSION {
            return Err(HostError::UnsupportedSchema {
                expected: DOCUMENT_SCHEMA_VERSION.to_string(),
                actual: doc.schema_version,
            });
        }

        for name in doc.options.keys() {
            if name.parse::<Namespace>().is_err() {
                debug!(namespace = %name, "Namespace is not sanitized, leaving as is");
            }
        }

        let mut project = Self::with_document(path, doc);
        project.dirty = false;
        Ok(project)
    }

    /// Wrap an in-memory document that will be stored at `path`.
    ///
    /// The project starts dirty because nothing has been written yet.
    pub fn with_document(path: impl Into<PathBuf>, doc: ProjectDocument) -> Self {
        let path = path.into();
        let name = doc
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| "project".to_string());

        Self {
            path,
            name,
            doc,
            dirty: true,
        }
    }

    /// The in-memory document.
    pub fn document(&self) -> &ProjectDocument {
        &self.doc
    }
}

impl Project for JsonProject {
    fn name(&self) -> &str {
        &self.name
    }

    fn backing_location(&self) -> &Path {
        &self.path
    }

    fn executable_path(&self) -> &str {
        &self.doc.executable_path
    }

    fn executable_format(&self) -> &str {
        &self.doc.executable_format
    }

    fn set_executable_path(&mut self, path: &str) {
        if self.doc.executable_path != path {
            self.doc.executable_path = path.to_string();
            self.dirty = true;
        }
    }

    fn set_executable_format(&mut self, format: &str) {
        if self.doc.executable_format != format {
            self.doc.executable_format = format.to_string();
            self.dirty = true;
        }
    }

    fn options(&mut self, namespace: Namespace) -> Result<Box<dyn OptionNamespace + '_>> {
        let entries = self
            .doc
            .options
            .entry(namespace.as_str().to_string())
            .or_default();
        Ok(Box::new(NamespaceView {
            entries,
            dirty: &mut self.dirty,
        }))
    }

    fn bookmarks(&mut self) -> Option<Box<dyn BookmarkManager + '_>> {
        Some(Box::new(BookmarkView {
            categories: &mut self.doc.bookmarks,
            dirty: &mut self.dirty,
        }))
    }

    fn persist(&mut self) -> Result<()> {
        let json = self.doc.to_json().map_err(|e| HostError::Persist {
            path: self.path.clone(),
            source: std::io::Error::new(ErrorKind::InvalidData, e),
        })?;

        // Write beside the target, then rename over it.
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let tmp_path = self.path.with_file_name(format!(".{}.tmp", file_name));

        let write = std::fs::write(&tmp_path, json.as_bytes())
            .and_then(|_| std::fs::rename(&tmp_path, &self.path));
        if let Err(source) = write {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(HostError::Persist {
                path: self.path.clone(),
                source,
            });
        }

        self.dirty = false;
        debug!(path = %self.path.display(), bytes = json.len(), "Project persisted");
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }
}

struct NamespaceView<'a> {
    entries: &'a mut BTreeMap<String, Value>,
    dirty: &'a mut bool,
}

impl OptionNamespace for NamespaceView<'_> {
    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn list_keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            *self.dirty = true;
        }
        Ok(())
    }
}

struct BookmarkView<'a> {
    categories: &'a mut BTreeMap<String, Vec<BookmarkRecord>>,
    dirty: &'a mut bool,
}

impl BookmarkManager for BookmarkView<'_> {
    fn list_categories(&self, monitor: &dyn TaskMonitor) -> Result<Vec<String>> {
        monitor.set_message(&format!(
            "listing {} bookmark categories",
            self.categories.len()
        ));
        Ok(self.categories.keys().cloned().collect())
    }

    fn list_bookmarks(&self, category: &str) -> Result<Vec<Bookmark>> {
        Ok(self
            .categories
            .get(category)
            .map(|records| {
                records
                    .iter()
                    .map(|r| Bookmark::new(category, r.id))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn remove(&mut self, bookmark: &Bookmark) -> Result<()> {
        let not_found = || HostError::BookmarkNotFound {
            category: bookmark.category.clone(),
            id: bookmark.id,
        };
        let records = self
            .categories
            .get_mut(&bookmark.category)
            .ok_or_else(not_found)?;
        let pos = records
            .iter()
            .position(|r| r.id == bookmark.id)
            .ok_or_else(not_found)?;
        records.remove(pos);
        *self.dirty = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TracingMonitor;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_document() -> ProjectDocument {
        let mut doc = ProjectDocument::default();
        doc.executable_path = "/home/alice/fw.bin".to_string();
        doc.executable_format = "ELF".to_string();
        doc.set_option(Namespace::ProgramInformation, "Created By", json!("alice"));
        doc.set_option(Namespace::ProgramInformation, "Comment", json!("v2"));
        doc.add_bookmark(
            "Analysis",
            BookmarkRecord {
                id: 1,
                address: "0x401000".to_string(),
                comment: "entry".to_string(),
            },
        );
        doc
    }

    fn write_project(dir: &TempDir, doc: &ProjectDocument) -> PathBuf {
        let path = dir.path().join("firmware.json");
        std::fs::write(&path, doc.to_json().unwrap()).unwrap();
        path
    }

    #[test]
    fn test_open_missing_project() {
        let dir = TempDir::new().unwrap();
        let result = JsonProject::open(dir.path().join("absent.json"));
        assert!(matches!(result, Err(HostError::ProjectNotFound { .. })));
    }

    #[test]
    fn test_open_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonProject::open(&path),
            Err(HostError::Parse { .. })
        ));
    }

    #[test]
    fn test_open_rejects_unknown_schema() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("future.json");
        std::fs::write(&path, r#"{"schema_version": "9.0.0"}"#).unwrap();
        assert!(matches!(
            JsonProject::open(&path),
            Err(HostError::UnsupportedSchema { .. })
        ));
    }

    #[test]
    fn test_name_falls_back_to_file_stem() {
        let dir = TempDir::new().unwrap();
        let path = write_project(&dir, &sample_document());
        let project = JsonProject::open(&path).unwrap();
        assert_eq!(project.name(), "firmware");
        assert!(!project.is_dirty());
        assert_eq!(project.project_dir(), Some(dir.path()));
    }

    #[test]
    fn test_explicit_name_wins() {
        let mut doc = sample_document();
        doc.name = Some("router".to_string());
        let project = JsonProject::with_document("/tmp/x/firmware.json", doc);
        assert_eq!(project.name(), "router");
    }

    #[test]
    fn test_option_removal_marks_dirty() {
        let dir = TempDir::new().unwrap();
        let path = write_project(&dir, &sample_document());
        let mut project = JsonProject::open(&path).unwrap();

        {
            let mut ns = project.options(Namespace::ProgramInformation).unwrap();
            assert!(ns.contains("Created By"));
            ns.remove("Created By").unwrap();
            ns.remove("Not There").unwrap();
        }

        assert!(project.is_dirty());
        assert!(project
            .document()
            .option(Namespace::ProgramInformation, "Created By")
            .is_none());
    }

    #[test]
    fn test_unchanged_setter_keeps_clean() {
        let dir = TempDir::new().unwrap();
        let path = write_project(&dir, &sample_document());
        let mut project = JsonProject::open(&path).unwrap();
        project.set_executable_format("ELF");
        assert!(!project.is_dirty());
        project.set_executable_format("");
        assert!(project.is_dirty());
    }

    #[test]
    fn test_bookmark_removal_keeps_category() {
        let mut project = JsonProject::with_document("/tmp/p.json", sample_document());
        {
            let mut manager = project.bookmarks().unwrap();
            let categories = manager.list_categories(&TracingMonitor).unwrap();
            assert_eq!(categories, vec!["Analysis".to_string()]);
            let marks = manager.list_bookmarks("Analysis").unwrap();
            assert_eq!(marks.len(), 1);
            manager.remove(&marks[0]).unwrap();
            assert!(matches!(
                manager.remove(&marks[0]),
                Err(HostError::BookmarkNotFound { .. })
            ));
        }
        assert_eq!(project.document().bookmark_count(), 0);
        assert!(project.document().bookmarks.contains_key("Analysis"));
    }

    #[test]
    fn test_persist_writes_and_clears_dirty() {
        let dir = TempDir::new().unwrap();
        let path = write_project(&dir, &sample_document());
        let mut project = JsonProject::open(&path).unwrap();
        project.set_executable_path("");
        project.persist().unwrap();
        assert!(!project.is_dirty());

        let reloaded = JsonProject::open(&path).unwrap();
        assert_eq!(reloaded.executable_path(), "");
        // No temp file left behind.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
