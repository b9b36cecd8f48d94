//! Stage run records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{PcStageError, Result};

/// Correlates one launch attempt of a stage with the backend run it started.
///
/// The stage name is captured when the record is created and never changes.
/// The run handle starts out unset and may be assigned exactly once, after
/// the backend confirms the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRunRecord {
    stage_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    run_handle: Option<String>,
    created_at: DateTime<Utc>,
}

impl StageRunRecord {
    /// Creates a record for a launch of `stage_name` with no run handle.
    #[must_use]
    pub fn new(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            run_handle: None,
            created_at: Utc::now(),
        }
    }

    /// Returns the name of the stage that produced this record.
    #[must_use]
    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    /// Returns the backend run handle, if the run was started.
    #[must_use]
    pub fn run_handle(&self) -> Option<&str> {
        self.run_handle.as_deref()
    }

    /// When the record was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Assigns the backend run handle.
    ///
    /// Fails if a handle was already assigned.
    pub fn assign_run_handle(&mut self, handle: impl Into<String>) -> Result<()> {
        if let Some(existing) = &self.run_handle {
            return Err(PcStageError::RunHandleAlreadySet {
                stage: self.stage_name.clone(),
                handle: existing.clone(),
            });
        }
        self.run_handle = Some(handle.into());
        Ok(())
    }
}
