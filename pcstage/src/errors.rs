//! Error types for pcstage.
//!
//! Two families exist: [`WorkflowError`] is what a workflow backend reports,
//! and [`PcStageError`] is what stage services report to the orchestrator.
//! Nothing here is retried internally; [`PcStageError::is_retryable`] and
//! [`PcStageError::is_fatal`] tell the caller how to react.

use std::collections::HashMap;
use thiserror::Error;

/// Convenience result alias for pcstage operations.
pub type Result<T, E = PcStageError> = std::result::Result<T, E>;

/// The main error type for stage-service operations.
#[derive(Debug, Error)]
pub enum PcStageError {
    /// The last run record does not belong to the current stage.
    #[error(
        "State corruption: current stage is '{current_stage}' but the last run record belongs to '{recorded_stage}'"
    )]
    StateCorruption {
        /// Name of the instance's current stage.
        current_stage: String,
        /// Stage name captured on the last run record.
        recorded_stage: String,
    },

    /// The backend reported a status outside the declared set.
    #[error("Invalid workflow status reported by backend: '{value}'")]
    InvalidBackendStatus {
        /// The raw value reported.
        value: String,
    },

    /// A string did not name any canonical status.
    #[error("Unknown private computation status: '{value}'")]
    UnknownStatus {
        /// The rejected value.
        value: String,
    },

    /// No stage service is registered for a stage.
    #[error("No stage service registered for stage '{name}'")]
    UnknownStage {
        /// The stage name looked up.
        name: String,
    },

    /// A run record already carries a backend handle.
    #[error("Run record for stage '{stage}' already has run handle '{handle}'")]
    RunHandleAlreadySet {
        /// The stage the record belongs to.
        stage: String,
        /// The handle already assigned.
        handle: String,
    },

    /// A workflow backend call failed.
    #[error("{0}")]
    Workflow(#[from] WorkflowError),

    /// Stage configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PcStageError {
    /// Creates a state corruption error.
    #[must_use]
    pub fn state_corruption(
        current_stage: impl Into<String>,
        recorded_stage: impl Into<String>,
    ) -> Self {
        Self::StateCorruption {
            current_stage: current_stage.into(),
            recorded_stage: recorded_stage.into(),
        }
    }

    /// Creates an unknown stage error.
    #[must_use]
    pub fn unknown_stage(name: impl Into<String>) -> Self {
        Self::UnknownStage { name: name.into() }
    }

    /// Returns true if the error signals a programming or contract error
    /// that must not be retried.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::StateCorruption { .. }
                | Self::InvalidBackendStatus { .. }
                | Self::RunHandleAlreadySet { .. }
        )
    }

    /// Returns true if the orchestrator may retry the failed call.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Workflow(err) if err.is_transient())
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        match self {
            Self::StateCorruption {
                current_stage,
                recorded_stage,
            } => {
                map.insert("type".to_string(), serde_json::json!("StateCorruption"));
                map.insert("current_stage".to_string(), serde_json::json!(current_stage));
                map.insert("recorded_stage".to_string(), serde_json::json!(recorded_stage));
            }
            Self::InvalidBackendStatus { value } => {
                map.insert("type".to_string(), serde_json::json!("InvalidBackendStatus"));
                map.insert("value".to_string(), serde_json::json!(value));
            }
            Self::UnknownStatus { value } => {
                map.insert("type".to_string(), serde_json::json!("UnknownStatus"));
                map.insert("value".to_string(), serde_json::json!(value));
            }
            Self::UnknownStage { name } => {
                map.insert("type".to_string(), serde_json::json!("UnknownStage"));
                map.insert("name".to_string(), serde_json::json!(name));
            }
            Self::RunHandleAlreadySet { stage, handle } => {
                map.insert("type".to_string(), serde_json::json!("RunHandleAlreadySet"));
                map.insert("stage".to_string(), serde_json::json!(stage));
                map.insert("handle".to_string(), serde_json::json!(handle));
            }
            Self::Workflow(err) => {
                map.insert("type".to_string(), serde_json::json!("Workflow"));
                map.insert("kind".to_string(), serde_json::json!(err.kind()));
            }
            Self::Configuration(_) => {
                map.insert("type".to_string(), serde_json::json!("Configuration"));
            }
            Self::Io(_) => {
                map.insert("type".to_string(), serde_json::json!("Io"));
            }
        }

        map.insert("fatal".to_string(), serde_json::json!(self.is_fatal()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));
        map
    }
}

impl From<serde_json::Error> for PcStageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Errors reported by a workflow backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The backend could not be reached or timed out.
    #[error("Workflow backend unavailable: {reason}")]
    Unavailable {
        /// What went wrong.
        reason: String,
    },

    /// The backend does not know the run handle.
    #[error("Unknown workflow run: {run_id}")]
    UnknownRun {
        /// The handle queried.
        run_id: String,
    },

    /// The backend refused to start the workflow.
    #[error("Workflow rejected: {reason}")]
    Rejected {
        /// The reason given by the backend.
        reason: String,
    },

    /// The backend reported a status string outside the declared set.
    #[error("Unrecognized workflow status: '{value}'")]
    UnrecognizedStatus {
        /// The raw value reported.
        value: String,
    },
}

impl WorkflowError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Creates an unknown run error.
    #[must_use]
    pub fn unknown_run(run_id: impl Into<String>) -> Self {
        Self::UnknownRun {
            run_id: run_id.into(),
        }
    }

    /// Creates a rejected error.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Returns true if the failure may clear up on its own.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }

    /// Short machine-readable name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "unavailable",
            Self::UnknownRun { .. } => "unknown_run",
            Self::Rejected { .. } => "rejected",
            Self::UnrecognizedStatus { .. } => "unrecognized_status",
        }
    }
}
