//! Stage service backed by a workflow backend.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{current_run_record, StageService};
use crate::backend::{WorkflowService, WorkflowStatus};
use crate::config::{RunParameters, PID_MR_GROUP};
use crate::core::PrivateComputationStatus;
use crate::errors::{PcStageError, Result, WorkflowError};
use crate::instance::{PrivateComputationInstance, StageRunRecord};

/// Launches a stage as a run on the workflow backend and maps the run's
/// status onto the current stage's canonical statuses.
///
/// The service reads its backend configuration from the instance's stage
/// configuration under `group`.
pub struct WorkflowStageService {
    group: String,
    backend: Arc<dyn WorkflowService>,
}

impl WorkflowStageService {
    /// Creates a service for the stage group `group`.
    pub fn new(group: impl Into<String>, backend: Arc<dyn WorkflowService>) -> Self {
        Self {
            group: group.into(),
            backend,
        }
    }

    /// Creates the PID MapReduce match stage service.
    #[must_use]
    pub fn pid_mr(backend: Arc<dyn WorkflowService>) -> Self {
        Self::new(PID_MR_GROUP, backend)
    }

    /// Returns the stage group this service reads configuration from.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }
}

impl std::fmt::Debug for WorkflowStageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowStageService")
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StageService for WorkflowStageService {
    async fn launch(
        &self,
        mut instance: PrivateComputationInstance,
        peer_addresses: Option<&[String]>,
    ) -> Result<PrivateComputationInstance> {
        let stage_name = instance.current_stage().name().to_string();
        info!(
            instance_id = %instance.instance_id(),
            stage = %stage_name,
            role = %instance.role(),
            group = %self.group,
            "Launching workflow stage"
        );
        if let Some(addresses) = peer_addresses {
            debug!(
                instance_id = %instance.instance_id(),
                peer_count = addresses.len(),
                "Peer addresses are not used by workflow stages"
            );
        }

        let mut record = StageRunRecord::new(stage_name.as_str());

        match instance.stage_configuration().launch_config(&self.group) {
            Some(launch) => {
                let params = RunParameters {
                    input_path: instance.input_path().to_string(),
                    output_path: instance.stage_output_path(&self.group),
                    instance_id: instance.instance_id().to_string(),
                };
                let run_config = launch.run_configuration(&params);
                let handle = self
                    .backend
                    .start_workflow(launch.workflow, instance.instance_id(), &run_config)
                    .await?;
                info!(
                    instance_id = %instance.instance_id(),
                    stage = %stage_name,
                    run_handle = %handle,
                    "Workflow started"
                );
                record.assign_run_handle(handle)?;
            }
            None => {
                warn!(
                    instance_id = %instance.instance_id(),
                    stage = %stage_name,
                    group = %self.group,
                    "Workflow or run configuration missing; stage recorded without starting a run"
                );
            }
        }

        instance.append_run_record(record);
        Ok(instance)
    }

    async fn status(&self, instance: &PrivateComputationInstance) -> Result<PrivateComputationStatus> {
        let Some(record) = current_run_record(instance)? else {
            return Ok(instance.status());
        };

        let workflow_config = instance.stage_configuration().workflow_config(&self.group);
        let workflow_status = match (workflow_config, record.run_handle()) {
            (Some(workflow), Some(handle)) => self
                .backend
                .get_workflow_status(workflow, handle)
                .await
                .map_err(|err| match err {
                    WorkflowError::UnrecognizedStatus { value } => {
                        PcStageError::InvalidBackendStatus { value }
                    }
                    other => PcStageError::Workflow(other),
                })?,
            // No run was started for this record. The instance id is not
            // polled as a stand-in handle; the stage reads as started.
            _ => WorkflowStatus::Started,
        };

        let stage = instance.current_stage();
        let status = match workflow_status {
            WorkflowStatus::Unknown | WorkflowStatus::Created | WorkflowStatus::Started => {
                stage.started_status()
            }
            WorkflowStatus::Completed => stage.completed_status(),
            WorkflowStatus::Failed => stage.failed_status(),
        };

        debug!(
            instance_id = %instance.instance_id(),
            stage = %stage.name(),
            run_handle = ?record.run_handle(),
            workflow_status = %workflow_status,
            status = %status,
            "Polled workflow stage"
        );
        Ok(status)
    }
}
