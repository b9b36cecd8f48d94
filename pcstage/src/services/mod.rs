//! Stage services.
//!
//! A stage service launches one stage of an instance and reports the stage's
//! progress as a canonical status. There is one implementation per stage
//! kind; the orchestrator picks the right one from a [`StageServiceRegistry`]
//! by the name of the instance's current stage.

mod pass_through;
mod registry;
#[cfg(test)]
mod service_tests;
mod workflow;

pub use pass_through::PassThroughStageService;
pub use registry::StageServiceRegistry;
pub use workflow::WorkflowStageService;

use async_trait::async_trait;
use std::fmt::Debug;

use crate::core::PrivateComputationStatus;
use crate::errors::{PcStageError, Result};
use crate::instance::{PrivateComputationInstance, StageRunRecord};

/// Trait for stage services.
///
/// Callers must serialize `launch` and `status` per instance; nothing here
/// locks the instance.
#[async_trait]
pub trait StageService: Send + Sync + Debug {
    /// Launches the instance's current stage.
    ///
    /// Appends exactly one run record for the current stage and changes
    /// nothing else on the instance. Does not wait for the stage to finish.
    ///
    /// # Arguments
    ///
    /// * `instance` - The instance whose current stage is launched
    /// * `peer_addresses` - Network endpoints of the other party's containers,
    ///   for stage kinds that contact a peer
    async fn launch(
        &self,
        instance: PrivateComputationInstance,
        peer_addresses: Option<&[String]>,
    ) -> Result<PrivateComputationInstance>;

    /// Returns the latest status of the instance's current stage.
    ///
    /// With an empty history this is the instance's status unchanged. Does
    /// not mutate the instance; persisting the result is up to the caller.
    async fn status(&self, instance: &PrivateComputationInstance) -> Result<PrivateComputationStatus>;
}

/// Returns the last run record, checking it belongs to the current stage.
///
/// A record of another stage means the orchestrator advanced the stage
/// without launching it, which is reported as state corruption.
pub(crate) fn current_run_record(
    instance: &PrivateComputationInstance,
) -> Result<Option<&StageRunRecord>> {
    let Some(record) = instance.last_run_record() else {
        return Ok(None);
    };

    let current = instance.current_stage().name();
    if record.stage_name() != current {
        return Err(PcStageError::state_corruption(current, record.stage_name()));
    }
    Ok(Some(record))
}
