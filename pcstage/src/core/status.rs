//! Canonical pipeline status space.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::phase::{PhaseOutcome, StagePhase};
use crate::errors::PcStageError;

/// The canonical status of a private computation instance.
///
/// Every phase contributes a `STARTED` / `COMPLETED` / `FAILED` triplet.
/// `UNKNOWN`, `PROCESSING_REQUEST` and `TIMEOUT` belong to no phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivateComputationStatus {
    /// No status has been observed yet.
    #[default]
    Unknown,
    /// Instance creation started.
    CreationStarted,
    /// Creation completed. Keeps its historical wire name `CREATED`.
    Created,
    /// Instance creation failed.
    CreationFailed,
    /// Input data validation started.
    InputDataValidationStarted,
    /// Input data validation completed.
    InputDataValidationCompleted,
    /// Input data validation failed.
    InputDataValidationFailed,
    /// Identity-match sharding started.
    PidShardStarted,
    /// Identity-match sharding completed.
    PidShardCompleted,
    /// Identity-match sharding failed.
    PidShardFailed,
    /// Identity-match preparation started.
    PidPrepareStarted,
    /// Identity-match preparation completed.
    PidPrepareCompleted,
    /// Identity-match preparation failed.
    PidPrepareFailed,
    /// Identity matching started.
    IdMatchingStarted,
    /// Identity matching completed.
    IdMatchingCompleted,
    /// Identity matching failed.
    IdMatchingFailed,
    /// Identity-match post-processing started.
    IdMatchingPostProcessStarted,
    /// Identity-match post-processing completed.
    IdMatchingPostProcessCompleted,
    /// Identity-match post-processing failed.
    IdMatchingPostProcessFailed,
    /// Data preparation started.
    PrepareDataStarted,
    /// Data preparation completed.
    PrepareDataCompleted,
    /// Data preparation failed.
    PrepareDataFailed,
    /// Identity spine combining started.
    IdSpineCombinerStarted,
    /// Identity spine combining completed.
    IdSpineCombinerCompleted,
    /// Identity spine combining failed.
    IdSpineCombinerFailed,
    /// Resharding started.
    ReshardStarted,
    /// Resharding completed.
    ReshardCompleted,
    /// Resharding failed.
    ReshardFailed,
    /// Computation started.
    ComputationStarted,
    /// Computation completed.
    ComputationCompleted,
    /// Computation failed.
    ComputationFailed,
    /// Decoupled attribution started.
    DecoupledAttributionStarted,
    /// Decoupled attribution completed.
    DecoupledAttributionCompleted,
    /// Decoupled attribution failed.
    DecoupledAttributionFailed,
    /// Decoupled aggregation started.
    DecoupledAggregationStarted,
    /// Decoupled aggregation completed.
    DecoupledAggregationCompleted,
    /// Decoupled aggregation failed.
    DecoupledAggregationFailed,
    /// PCF2 attribution started.
    #[serde(rename = "PCF2_ATTRIBUTION_STARTED")]
    Pcf2AttributionStarted,
    /// PCF2 attribution completed.
    #[serde(rename = "PCF2_ATTRIBUTION_COMPLETED")]
    Pcf2AttributionCompleted,
    /// PCF2 attribution failed.
    #[serde(rename = "PCF2_ATTRIBUTION_FAILED")]
    Pcf2AttributionFailed,
    /// PCF2 aggregation started.
    #[serde(rename = "PCF2_AGGREGATION_STARTED")]
    Pcf2AggregationStarted,
    /// PCF2 aggregation completed.
    #[serde(rename = "PCF2_AGGREGATION_COMPLETED")]
    Pcf2AggregationCompleted,
    /// PCF2 aggregation failed.
    #[serde(rename = "PCF2_AGGREGATION_FAILED")]
    Pcf2AggregationFailed,
    /// Aggregation started.
    AggregationStarted,
    /// Aggregation completed.
    AggregationCompleted,
    /// Aggregation failed.
    AggregationFailed,
    /// Post-processing handlers started.
    PostProcessingHandlersStarted,
    /// Post-processing handlers completed.
    PostProcessingHandlersCompleted,
    /// Post-processing handlers failed.
    PostProcessingHandlersFailed,
    /// A request for the instance is being processed.
    ProcessingRequest,
    /// The orchestrator gave up waiting on the instance.
    Timeout,
}

impl PrivateComputationStatus {
    /// Every status value, singletons first, then phases in pipeline order.
    pub const ALL: [Self; 51] = [
        Self::Unknown,
        Self::ProcessingRequest,
        Self::Timeout,
        Self::CreationStarted,
        Self::Created,
        Self::CreationFailed,
        Self::InputDataValidationStarted,
        Self::InputDataValidationCompleted,
        Self::InputDataValidationFailed,
        Self::PidShardStarted,
        Self::PidShardCompleted,
        Self::PidShardFailed,
        Self::PidPrepareStarted,
        Self::PidPrepareCompleted,
        Self::PidPrepareFailed,
        Self::IdMatchingStarted,
        Self::IdMatchingCompleted,
        Self::IdMatchingFailed,
        Self::IdMatchingPostProcessStarted,
        Self::IdMatchingPostProcessCompleted,
        Self::IdMatchingPostProcessFailed,
        Self::PrepareDataStarted,
        Self::PrepareDataCompleted,
        Self::PrepareDataFailed,
        Self::IdSpineCombinerStarted,
        Self::IdSpineCombinerCompleted,
        Self::IdSpineCombinerFailed,
        Self::ReshardStarted,
        Self::ReshardCompleted,
        Self::ReshardFailed,
        Self::ComputationStarted,
        Self::ComputationCompleted,
        Self::ComputationFailed,
        Self::DecoupledAttributionStarted,
        Self::DecoupledAttributionCompleted,
        Self::DecoupledAttributionFailed,
        Self::DecoupledAggregationStarted,
        Self::DecoupledAggregationCompleted,
        Self::DecoupledAggregationFailed,
        Self::Pcf2AttributionStarted,
        Self::Pcf2AttributionCompleted,
        Self::Pcf2AttributionFailed,
        Self::Pcf2AggregationStarted,
        Self::Pcf2AggregationCompleted,
        Self::Pcf2AggregationFailed,
        Self::AggregationStarted,
        Self::AggregationCompleted,
        Self::AggregationFailed,
        Self::PostProcessingHandlersStarted,
        Self::PostProcessingHandlersCompleted,
        Self::PostProcessingHandlersFailed,
    ];

    /// Returns the wire name of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::CreationStarted => "CREATION_STARTED",
            Self::Created => "CREATED",
            Self::CreationFailed => "CREATION_FAILED",
            Self::InputDataValidationStarted => "INPUT_DATA_VALIDATION_STARTED",
            Self::InputDataValidationCompleted => "INPUT_DATA_VALIDATION_COMPLETED",
            Self::InputDataValidationFailed => "INPUT_DATA_VALIDATION_FAILED",
            Self::PidShardStarted => "PID_SHARD_STARTED",
            Self::PidShardCompleted => "PID_SHARD_COMPLETED",
            Self::PidShardFailed => "PID_SHARD_FAILED",
            Self::PidPrepareStarted => "PID_PREPARE_STARTED",
            Self::PidPrepareCompleted => "PID_PREPARE_COMPLETED",
            Self::PidPrepareFailed => "PID_PREPARE_FAILED",
            Self::IdMatchingStarted => "ID_MATCHING_STARTED",
            Self::IdMatchingCompleted => "ID_MATCHING_COMPLETED",
            Self::IdMatchingFailed => "ID_MATCHING_FAILED",
            Self::IdMatchingPostProcessStarted => "ID_MATCHING_POST_PROCESS_STARTED",
            Self::IdMatchingPostProcessCompleted => "ID_MATCHING_POST_PROCESS_COMPLETED",
            Self::IdMatchingPostProcessFailed => "ID_MATCHING_POST_PROCESS_FAILED",
            Self::PrepareDataStarted => "PREPARE_DATA_STARTED",
            Self::PrepareDataCompleted => "PREPARE_DATA_COMPLETED",
            Self::PrepareDataFailed => "PREPARE_DATA_FAILED",
            Self::IdSpineCombinerStarted => "ID_SPINE_COMBINER_STARTED",
            Self::IdSpineCombinerCompleted => "ID_SPINE_COMBINER_COMPLETED",
            Self::IdSpineCombinerFailed => "ID_SPINE_COMBINER_FAILED",
            Self::ReshardStarted => "RESHARD_STARTED",
            Self::ReshardCompleted => "RESHARD_COMPLETED",
            Self::ReshardFailed => "RESHARD_FAILED",
            Self::ComputationStarted => "COMPUTATION_STARTED",
            Self::ComputationCompleted => "COMPUTATION_COMPLETED",
            Self::ComputationFailed => "COMPUTATION_FAILED",
            Self::DecoupledAttributionStarted => "DECOUPLED_ATTRIBUTION_STARTED",
            Self::DecoupledAttributionCompleted => "DECOUPLED_ATTRIBUTION_COMPLETED",
            Self::DecoupledAttributionFailed => "DECOUPLED_ATTRIBUTION_FAILED",
            Self::DecoupledAggregationStarted => "DECOUPLED_AGGREGATION_STARTED",
            Self::DecoupledAggregationCompleted => "DECOUPLED_AGGREGATION_COMPLETED",
            Self::DecoupledAggregationFailed => "DECOUPLED_AGGREGATION_FAILED",
            Self::Pcf2AttributionStarted => "PCF2_ATTRIBUTION_STARTED",
            Self::Pcf2AttributionCompleted => "PCF2_ATTRIBUTION_COMPLETED",
            Self::Pcf2AttributionFailed => "PCF2_ATTRIBUTION_FAILED",
            Self::Pcf2AggregationStarted => "PCF2_AGGREGATION_STARTED",
            Self::Pcf2AggregationCompleted => "PCF2_AGGREGATION_COMPLETED",
            Self::Pcf2AggregationFailed => "PCF2_AGGREGATION_FAILED",
            Self::AggregationStarted => "AGGREGATION_STARTED",
            Self::AggregationCompleted => "AGGREGATION_COMPLETED",
            Self::AggregationFailed => "AGGREGATION_FAILED",
            Self::PostProcessingHandlersStarted => "POST_PROCESSING_HANDLERS_STARTED",
            Self::PostProcessingHandlersCompleted => "POST_PROCESSING_HANDLERS_COMPLETED",
            Self::PostProcessingHandlersFailed => "POST_PROCESSING_HANDLERS_FAILED",
            Self::ProcessingRequest => "PROCESSING_REQUEST",
            Self::Timeout => "TIMEOUT",
        }
    }

    /// Returns the phase and outcome this status belongs to, or `None` for
    /// the singleton statuses.
    #[must_use]
    pub const fn classify(&self) -> Option<(StagePhase, PhaseOutcome)> {
        use PhaseOutcome::{Completed, Failed, Started};
        use StagePhase as P;

        let classified = match self {
            Self::Unknown | Self::ProcessingRequest | Self::Timeout => return None,
            Self::CreationStarted => (P::Creation, Started),
            Self::Created => (P::Creation, Completed),
            Self::CreationFailed => (P::Creation, Failed),
            Self::InputDataValidationStarted => (P::InputDataValidation, Started),
            Self::InputDataValidationCompleted => (P::InputDataValidation, Completed),
            Self::InputDataValidationFailed => (P::InputDataValidation, Failed),
            Self::PidShardStarted => (P::PidShard, Started),
            Self::PidShardCompleted => (P::PidShard, Completed),
            Self::PidShardFailed => (P::PidShard, Failed),
            Self::PidPrepareStarted => (P::PidPrepare, Started),
            Self::PidPrepareCompleted => (P::PidPrepare, Completed),
            Self::PidPrepareFailed => (P::PidPrepare, Failed),
            Self::IdMatchingStarted => (P::IdMatching, Started),
            Self::IdMatchingCompleted => (P::IdMatching, Completed),
            Self::IdMatchingFailed => (P::IdMatching, Failed),
            Self::IdMatchingPostProcessStarted => (P::IdMatchingPostProcess, Started),
            Self::IdMatchingPostProcessCompleted => (P::IdMatchingPostProcess, Completed),
            Self::IdMatchingPostProcessFailed => (P::IdMatchingPostProcess, Failed),
            Self::PrepareDataStarted => (P::PrepareData, Started),
            Self::PrepareDataCompleted => (P::PrepareData, Completed),
            Self::PrepareDataFailed => (P::PrepareData, Failed),
            Self::IdSpineCombinerStarted => (P::IdSpineCombiner, Started),
            Self::IdSpineCombinerCompleted => (P::IdSpineCombiner, Completed),
            Self::IdSpineCombinerFailed => (P::IdSpineCombiner, Failed),
            Self::ReshardStarted => (P::Reshard, Started),
            Self::ReshardCompleted => (P::Reshard, Completed),
            Self::ReshardFailed => (P::Reshard, Failed),
            Self::ComputationStarted => (P::Computation, Started),
            Self::ComputationCompleted => (P::Computation, Completed),
            Self::ComputationFailed => (P::Computation, Failed),
            Self::DecoupledAttributionStarted => (P::DecoupledAttribution, Started),
            Self::DecoupledAttributionCompleted => (P::DecoupledAttribution, Completed),
            Self::DecoupledAttributionFailed => (P::DecoupledAttribution, Failed),
            Self::DecoupledAggregationStarted => (P::DecoupledAggregation, Started),
            Self::DecoupledAggregationCompleted => (P::DecoupledAggregation, Completed),
            Self::DecoupledAggregationFailed => (P::DecoupledAggregation, Failed),
            Self::Pcf2AttributionStarted => (P::Pcf2Attribution, Started),
            Self::Pcf2AttributionCompleted => (P::Pcf2Attribution, Completed),
            Self::Pcf2AttributionFailed => (P::Pcf2Attribution, Failed),
            Self::Pcf2AggregationStarted => (P::Pcf2Aggregation, Started),
            Self::Pcf2AggregationCompleted => (P::Pcf2Aggregation, Completed),
            Self::Pcf2AggregationFailed => (P::Pcf2Aggregation, Failed),
            Self::AggregationStarted => (P::Aggregation, Started),
            Self::AggregationCompleted => (P::Aggregation, Completed),
            Self::AggregationFailed => (P::Aggregation, Failed),
            Self::PostProcessingHandlersStarted => (P::PostProcessingHandlers, Started),
            Self::PostProcessingHandlersCompleted => (P::PostProcessingHandlers, Completed),
            Self::PostProcessingHandlersFailed => (P::PostProcessingHandlers, Failed),
        };
        Some(classified)
    }

    /// Returns the phase this status belongs to.
    #[must_use]
    pub const fn phase(&self) -> Option<StagePhase> {
        match self.classify() {
            Some((phase, _)) => Some(phase),
            None => None,
        }
    }

    /// Returns the outcome within the phase.
    #[must_use]
    pub const fn outcome(&self) -> Option<PhaseOutcome> {
        match self.classify() {
            Some((_, outcome)) => Some(outcome),
            None => None,
        }
    }

    /// Returns true if the status ends a phase attempt, or the instance timed out.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        match self.outcome() {
            Some(outcome) => outcome.is_terminal(),
            None => matches!(self, Self::Timeout),
        }
    }

    /// Returns true if the status reports a failed phase.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self.outcome(), Some(PhaseOutcome::Failed))
    }
}

impl fmt::Display for PrivateComputationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrivateComputationStatus {
    type Err = PcStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| PcStageError::UnknownStatus {
                value: s.to_string(),
            })
    }
}
