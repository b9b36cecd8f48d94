//! Test fixtures for stage-service testing.

use serde_json::json;

use crate::config::{StageConfiguration, StageGroupConfig, PID_MR_GROUP};
use crate::core::{PrivateComputationStatus, StageDescriptor, StagePhase};
use crate::instance::{PrivateComputationInstance, PrivateComputationRole};

/// Builder for test instances.
#[derive(Debug, Clone)]
pub struct TestInstance {
    /// Instance id.
    pub instance_id: String,
    /// Role.
    pub role: PrivateComputationRole,
    /// Current stage.
    pub stage: StageDescriptor,
    /// Initial status.
    pub status: PrivateComputationStatus,
    /// Stage configuration.
    pub configuration: StageConfiguration,
}

impl Default for TestInstance {
    fn default() -> Self {
        Self {
            instance_id: "test-instance".to_string(),
            role: PrivateComputationRole::Publisher,
            stage: pid_mr_stage(),
            status: PrivateComputationStatus::Unknown,
            configuration: StageConfiguration::new(),
        }
    }
}

impl TestInstance {
    /// Creates a builder for a publisher instance in the PID MR stage with
    /// no configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the instance id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = id.into();
        self
    }

    /// Sets the role.
    #[must_use]
    pub fn with_role(mut self, role: PrivateComputationRole) -> Self {
        self.role = role;
        self
    }

    /// Sets the current stage.
    #[must_use]
    pub fn in_stage(mut self, stage: StageDescriptor) -> Self {
        self.stage = stage;
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub fn with_status(mut self, status: PrivateComputationStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the stage configuration.
    #[must_use]
    pub fn with_configuration(mut self, configuration: StageConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Uses [`pid_mr_configuration`].
    #[must_use]
    pub fn with_pid_mr_configuration(self) -> Self {
        self.with_configuration(pid_mr_configuration())
    }

    /// Builds the instance.
    #[must_use]
    pub fn build(self) -> PrivateComputationInstance {
        PrivateComputationInstance::new(
            self.instance_id,
            self.role,
            self.stage,
            "s3://test-bucket/input.csv",
            "s3://test-bucket/output",
        )
        .with_status(self.status)
        .with_stage_configuration(self.configuration)
    }
}

/// The PID MapReduce stage, reporting through `ID_MATCHING`.
#[must_use]
pub fn pid_mr_stage() -> StageDescriptor {
    StageDescriptor::new("PID_MR", StagePhase::IdMatching)
}

/// A complete `pid_mr` group configuration.
#[must_use]
pub fn pid_mr_configuration() -> StageConfiguration {
    StageConfiguration::new().with_group(
        PID_MR_GROUP,
        StageGroupConfig::new(
            json!({"stateMachineArn": "arn:workflow:pid-mr"}),
            json!({"numPartitions": 4}),
        ),
    )
}
