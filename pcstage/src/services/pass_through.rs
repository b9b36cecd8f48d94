//! Stage service for stages with no backend work.

use async_trait::async_trait;
use tracing::info;

use super::{current_run_record, StageService};
use crate::core::PrivateComputationStatus;
use crate::errors::Result;
use crate::instance::{PrivateComputationInstance, StageRunRecord};

/// A stage that completes as soon as it is launched.
///
/// Launching records the stage in the history without a run handle; the
/// stage then reports its completed status.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughStageService;

impl PassThroughStageService {
    /// Creates a new pass-through stage service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StageService for PassThroughStageService {
    async fn launch(
        &self,
        mut instance: PrivateComputationInstance,
        _peer_addresses: Option<&[String]>,
    ) -> Result<PrivateComputationInstance> {
        let stage_name = instance.current_stage().name().to_string();
        info!(
            instance_id = %instance.instance_id(),
            stage = %stage_name,
            "Passing through stage"
        );
        instance.append_run_record(StageRunRecord::new(stage_name));
        Ok(instance)
    }

    async fn status(&self, instance: &PrivateComputationInstance) -> Result<PrivateComputationStatus> {
        Ok(match current_run_record(instance)? {
            Some(_) => instance.current_stage().completed_status(),
            None => instance.status(),
        })
    }
}
