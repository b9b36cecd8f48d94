//! The private computation instance aggregate.
//!
//! An instance is driven through its stages by a single external
//! orchestrator. Stage services append to its run history; the orchestrator
//! advances the current stage and persists polled statuses.

mod record;

pub use record::StageRunRecord;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::StageConfiguration;
use crate::core::{PrivateComputationStatus, StageDescriptor};

/// Which organization an instance runs on behalf of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivateComputationRole {
    /// The initiating party.
    Publisher,
    /// The non-initiating party; contacts the publisher's containers.
    Partner,
}

impl fmt::Display for PrivateComputationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Publisher => write!(f, "publisher"),
            Self::Partner => write!(f, "partner"),
        }
    }
}

/// One run of the private computation pipeline, as seen by one party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateComputationInstance {
    instance_id: String,
    role: PrivateComputationRole,
    current_stage: StageDescriptor,
    status: PrivateComputationStatus,
    status_updated_at: DateTime<Utc>,
    input_path: String,
    output_dir: String,
    #[serde(default)]
    stage_configuration: StageConfiguration,
    #[serde(default)]
    history: Vec<StageRunRecord>,
}

impl PrivateComputationInstance {
    /// Creates an instance in `current_stage` with an `UNKNOWN` status and
    /// an empty history.
    #[must_use]
    pub fn new(
        instance_id: impl Into<String>,
        role: PrivateComputationRole,
        current_stage: StageDescriptor,
        input_path: impl Into<String>,
        output_dir: impl Into<String>,
    ) -> Self {
        Self {
            instance_id: instance_id.into(),
            role,
            current_stage,
            status: PrivateComputationStatus::Unknown,
            status_updated_at: Utc::now(),
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            stage_configuration: StageConfiguration::default(),
            history: Vec::new(),
        }
    }

    /// Sets the stage configuration.
    #[must_use]
    pub fn with_stage_configuration(mut self, configuration: StageConfiguration) -> Self {
        self.stage_configuration = configuration;
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub fn with_status(mut self, status: PrivateComputationStatus) -> Self {
        self.update_status(status);
        self
    }

    /// Returns the instance id.
    #[must_use]
    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Returns the role this instance plays.
    #[must_use]
    pub const fn role(&self) -> PrivateComputationRole {
        self.role
    }

    /// Returns the stage the instance is in.
    #[must_use]
    pub const fn current_stage(&self) -> &StageDescriptor {
        &self.current_stage
    }

    /// Returns the last known status.
    #[must_use]
    pub const fn status(&self) -> PrivateComputationStatus {
        self.status
    }

    /// When the status was last set.
    #[must_use]
    pub const fn status_updated_at(&self) -> DateTime<Utc> {
        self.status_updated_at
    }

    /// Returns the input path.
    #[must_use]
    pub fn input_path(&self) -> &str {
        &self.input_path
    }

    /// Returns the output directory.
    #[must_use]
    pub fn output_dir(&self) -> &str {
        &self.output_dir
    }

    /// Returns the stage configuration.
    #[must_use]
    pub const fn stage_configuration(&self) -> &StageConfiguration {
        &self.stage_configuration
    }

    /// Output path of a stage group: `{output_dir}/{instance_id}_out_dir/{group}`.
    #[must_use]
    pub fn stage_output_path(&self, group: &str) -> String {
        format!(
            "{}/{}_out_dir/{}",
            self.output_dir.trim_end_matches('/'),
            self.instance_id,
            group
        )
    }

    /// Returns the run history, oldest first.
    #[must_use]
    pub fn history(&self) -> &[StageRunRecord] {
        &self.history
    }

    /// Returns the most recent run record.
    #[must_use]
    pub fn last_run_record(&self) -> Option<&StageRunRecord> {
        self.history.last()
    }

    /// Appends a run record. History is never rewritten.
    pub fn append_run_record(&mut self, record: StageRunRecord) {
        self.history.push(record);
    }

    /// Records a newly observed status.
    pub fn update_status(&mut self, status: PrivateComputationStatus) {
        self.status = status;
        self.status_updated_at = Utc::now();
    }

    /// Moves the instance to its next stage. History is left untouched.
    pub fn advance_stage(&mut self, next: StageDescriptor) {
        self.current_stage = next;
    }
}
