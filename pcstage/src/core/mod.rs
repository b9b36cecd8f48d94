//! Core domain model types for pcstage.
//!
//! This module contains the closed status space of the pipeline and the
//! phase and stage descriptors that index into it.

mod phase;
mod status;

pub use phase::{PhaseOutcome, StageDescriptor, StagePhase};
pub use status::PrivateComputationStatus;
