//! Pipeline phases and the stage descriptors built on them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::PrivateComputationStatus;

/// Where a phase attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseOutcome {
    /// The phase has been launched and has not finished.
    Started,
    /// The phase finished successfully.
    Completed,
    /// The phase finished with an error.
    Failed,
}

impl PhaseOutcome {
    /// Returns true if the outcome ends the phase attempt.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A phase of the private computation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StagePhase {
    /// Instance creation.
    Creation,
    /// Validation of the input dataset.
    InputDataValidation,
    /// Sharding of identity-match inputs.
    PidShard,
    /// Preparation of identity-match shards.
    PidPrepare,
    /// Private identity matching.
    IdMatching,
    /// Post-processing of identity-match output.
    IdMatchingPostProcess,
    /// Data preparation ahead of computation.
    PrepareData,
    /// Combining the matched id spine with the dataset.
    IdSpineCombiner,
    /// Resharding the combined data.
    Reshard,
    /// Secure computation (lift).
    Computation,
    /// Decoupled attribution.
    DecoupledAttribution,
    /// Decoupled aggregation.
    DecoupledAggregation,
    /// PCF2 attribution.
    #[serde(rename = "PCF2_ATTRIBUTION")]
    Pcf2Attribution,
    /// PCF2 aggregation.
    #[serde(rename = "PCF2_AGGREGATION")]
    Pcf2Aggregation,
    /// Result aggregation.
    Aggregation,
    /// Post-processing handlers.
    PostProcessingHandlers,
}

impl StagePhase {
    /// Every phase, in pipeline order.
    pub const ALL: [Self; 16] = [
        Self::Creation,
        Self::InputDataValidation,
        Self::PidShard,
        Self::PidPrepare,
        Self::IdMatching,
        Self::IdMatchingPostProcess,
        Self::PrepareData,
        Self::IdSpineCombiner,
        Self::Reshard,
        Self::Computation,
        Self::DecoupledAttribution,
        Self::DecoupledAggregation,
        Self::Pcf2Attribution,
        Self::Pcf2Aggregation,
        Self::Aggregation,
        Self::PostProcessingHandlers,
    ];

    /// Returns the stable name of the phase.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Creation => "CREATION",
            Self::InputDataValidation => "INPUT_DATA_VALIDATION",
            Self::PidShard => "PID_SHARD",
            Self::PidPrepare => "PID_PREPARE",
            Self::IdMatching => "ID_MATCHING",
            Self::IdMatchingPostProcess => "ID_MATCHING_POST_PROCESS",
            Self::PrepareData => "PREPARE_DATA",
            Self::IdSpineCombiner => "ID_SPINE_COMBINER",
            Self::Reshard => "RESHARD",
            Self::Computation => "COMPUTATION",
            Self::DecoupledAttribution => "DECOUPLED_ATTRIBUTION",
            Self::DecoupledAggregation => "DECOUPLED_AGGREGATION",
            Self::Pcf2Attribution => "PCF2_ATTRIBUTION",
            Self::Pcf2Aggregation => "PCF2_AGGREGATION",
            Self::Aggregation => "AGGREGATION",
            Self::PostProcessingHandlers => "POST_PROCESSING_HANDLERS",
        }
    }

    /// Returns the `STARTED` / `COMPLETED` / `FAILED` triplet of the phase.
    #[must_use]
    pub const fn statuses(
        &self,
    ) -> (
        PrivateComputationStatus,
        PrivateComputationStatus,
        PrivateComputationStatus,
    ) {
        use PrivateComputationStatus as S;

        match self {
            Self::Creation => (S::CreationStarted, S::Created, S::CreationFailed),
            Self::InputDataValidation => (
                S::InputDataValidationStarted,
                S::InputDataValidationCompleted,
                S::InputDataValidationFailed,
            ),
            Self::PidShard => (S::PidShardStarted, S::PidShardCompleted, S::PidShardFailed),
            Self::PidPrepare => (
                S::PidPrepareStarted,
                S::PidPrepareCompleted,
                S::PidPrepareFailed,
            ),
            Self::IdMatching => (
                S::IdMatchingStarted,
                S::IdMatchingCompleted,
                S::IdMatchingFailed,
            ),
            Self::IdMatchingPostProcess => (
                S::IdMatchingPostProcessStarted,
                S::IdMatchingPostProcessCompleted,
                S::IdMatchingPostProcessFailed,
            ),
            Self::PrepareData => (
                S::PrepareDataStarted,
                S::PrepareDataCompleted,
                S::PrepareDataFailed,
            ),
            Self::IdSpineCombiner => (
                S::IdSpineCombinerStarted,
                S::IdSpineCombinerCompleted,
                S::IdSpineCombinerFailed,
            ),
            Self::Reshard => (S::ReshardStarted, S::ReshardCompleted, S::ReshardFailed),
            Self::Computation => (
                S::ComputationStarted,
                S::ComputationCompleted,
                S::ComputationFailed,
            ),
            Self::DecoupledAttribution => (
                S::DecoupledAttributionStarted,
                S::DecoupledAttributionCompleted,
                S::DecoupledAttributionFailed,
            ),
            Self::DecoupledAggregation => (
                S::DecoupledAggregationStarted,
                S::DecoupledAggregationCompleted,
                S::DecoupledAggregationFailed,
            ),
            Self::Pcf2Attribution => (
                S::Pcf2AttributionStarted,
                S::Pcf2AttributionCompleted,
                S::Pcf2AttributionFailed,
            ),
            Self::Pcf2Aggregation => (
                S::Pcf2AggregationStarted,
                S::Pcf2AggregationCompleted,
                S::Pcf2AggregationFailed,
            ),
            Self::Aggregation => (
                S::AggregationStarted,
                S::AggregationCompleted,
                S::AggregationFailed,
            ),
            Self::PostProcessingHandlers => (
                S::PostProcessingHandlersStarted,
                S::PostProcessingHandlersCompleted,
                S::PostProcessingHandlersFailed,
            ),
        }
    }

    /// Returns the status of this phase for the given outcome.
    #[must_use]
    pub const fn status(&self, outcome: PhaseOutcome) -> PrivateComputationStatus {
        let (started, completed, failed) = self.statuses();
        match outcome {
            PhaseOutcome::Started => started,
            PhaseOutcome::Completed => completed,
            PhaseOutcome::Failed => failed,
        }
    }

    /// Returns the `STARTED` status of this phase.
    #[must_use]
    pub const fn started_status(&self) -> PrivateComputationStatus {
        self.status(PhaseOutcome::Started)
    }

    /// Returns the `COMPLETED` status of this phase.
    #[must_use]
    pub const fn completed_status(&self) -> PrivateComputationStatus {
        self.status(PhaseOutcome::Completed)
    }

    /// Returns the `FAILED` status of this phase.
    #[must_use]
    pub const fn failed_status(&self) -> PrivateComputationStatus {
        self.status(PhaseOutcome::Failed)
    }
}

impl fmt::Display for StagePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes the stage an instance is currently in.
///
/// The `name` identifies the stage in run history and in the service
/// registry; the `phase` supplies its three canonical statuses. Several
/// stages may share one phase (the PID MapReduce stage reports through
/// `ID_MATCHING`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StageDescriptor {
    name: String,
    phase: StagePhase,
}

impl StageDescriptor {
    /// Creates a descriptor for a named stage reporting through `phase`.
    #[must_use]
    pub fn new(name: impl Into<String>, phase: StagePhase) -> Self {
        Self {
            name: name.into(),
            phase,
        }
    }

    /// Creates a descriptor named after its phase.
    #[must_use]
    pub fn for_phase(phase: StagePhase) -> Self {
        Self::new(phase.as_str(), phase)
    }

    /// Returns the stage name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the phase the stage reports through.
    #[must_use]
    pub const fn phase(&self) -> StagePhase {
        self.phase
    }

    /// Status reported while the stage's run is in flight.
    #[must_use]
    pub const fn started_status(&self) -> PrivateComputationStatus {
        self.phase.started_status()
    }

    /// Status reported once the stage's run succeeded.
    #[must_use]
    pub const fn completed_status(&self) -> PrivateComputationStatus {
        self.phase.completed_status()
    }

    /// Status reported once the stage's run failed.
    #[must_use]
    pub const fn failed_status(&self) -> PrivateComputationStatus {
        self.phase.failed_status()
    }
}

impl fmt::Display for StageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.phase)
    }
}
