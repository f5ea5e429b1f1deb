//! Persist step and its receipt.

use crate::{BundleError, Result};
use chrono::{DateTime, Utc};
use scrub_common::Project;
use serde::Serialize;
use tracing::info;

/// Proof that a project was written to its backing store.
///
/// Only `persist` can create one, so holding a receipt means the save
/// succeeded at least once. The exporter still checks the dirty flag, since
/// the project may have been mutated after the receipt was issued.
#[derive(Debug, Clone, Serialize)]
pub struct PersistReceipt {
    project: String,
    persisted_at: DateTime<Utc>,
}

impl PersistReceipt {
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Check that this receipt covers the current state of `project`.
    pub fn verify<P: Project + ?Sized>(&self, project: &P) -> Result<()> {
        if self.project != project.name() {
            return Err(BundleError::ReceiptMismatch {
                receipt: self.project.clone(),
                project: project.name().to_string(),
            });
        }
        if project.is_dirty() {
            return Err(BundleError::NotPersisted {
                project: project.name().to_string(),
            });
        }
        Ok(())
    }
}

/// Write `project` to its backing store and confirm nothing is left unsaved.
pub fn persist<P: Project + ?Sized>(project: &mut P) -> Result<PersistReceipt> {
    project.persist()?;
    if project.is_dirty() {
        return Err(BundleError::NotPersisted {
            project: project.name().to_string(),
        });
    }
    info!(
        project = %project.name(),
        location = %project.backing_location().display(),
        "Project persisted"
    );
    Ok(PersistReceipt {
        project: project.name().to_string(),
        persisted_at: Utc::now(),
    })
}
