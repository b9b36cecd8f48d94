//! Workflow backend boundary.
//!
//! The backend runs the actual stage work out-of-process. Stage services
//! reach it through two calls: [`WorkflowService::start_workflow`] registers
//! a run and returns its handle promptly, and
//! [`WorkflowService::get_workflow_status`] reports where the run stands.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::WorkflowError;

/// Status of a backend run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    /// The backend cannot tell yet.
    Unknown,
    /// The run is registered but not running.
    Created,
    /// The run is executing.
    Started,
    /// The run finished successfully.
    Completed,
    /// The run finished with an error.
    Failed,
}

impl WorkflowStatus {
    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Created => "CREATED",
            Self::Started => "STARTED",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(Self::Unknown),
            "CREATED" => Ok(Self::Created),
            "STARTED" => Ok(Self::Started),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            other => Err(WorkflowError::UnrecognizedStatus {
                value: other.to_string(),
            }),
        }
    }
}

/// A backend able to run stage workflows.
///
/// One backend is typically shared by many stage services, one per
/// instance; runs are keyed by correlation id and run handle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowService: Send + Sync {
    /// Registers a run and returns its handle without waiting for it to finish.
    ///
    /// # Arguments
    ///
    /// * `workflow_config` - The workflow definition to run
    /// * `correlation_id` - Caller-side id of the run (the instance id)
    /// * `run_config` - Run-specific parameters
    async fn start_workflow(
        &self,
        workflow_config: &serde_json::Value,
        correlation_id: &str,
        run_config: &serde_json::Value,
    ) -> Result<String, WorkflowError>;

    /// Reports the status of a run at this point in time.
    async fn get_workflow_status(
        &self,
        workflow_config: &serde_json::Value,
        run_id: &str,
    ) -> Result<WorkflowStatus, WorkflowError>;
}
