//! # pcstage
//!
//! Stage-run services for a two-party private computation pipeline.
//!
//! Each stage of the pipeline (identity matching, computation, aggregation,
//! ...) executes on an external workflow backend. pcstage provides:
//!
//! - **Status space**: the closed set of canonical pipeline statuses
//! - **Instances**: the pipeline instance aggregate and its append-only run history
//! - **Stage services**: launch a stage run and map its backend status
//!   onto the canonical status space
//! - **Backend boundary**: the workflow backend trait plus an in-memory backend
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pcstage::prelude::*;
//!
//! let registry = StageServiceRegistry::new()
//!     .with_service("PID_MR", Arc::new(WorkflowStageService::pid_mr(backend)));
//!
//! let service = registry.for_instance(&instance)?;
//! let instance = service.launch(instance, None).await?;
//! let status = service.status(&instance).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod backend;
pub mod config;
pub mod core;
pub mod errors;
pub mod instance;
pub mod observability;
pub mod services;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::backend::{WorkflowService, WorkflowStatus};
    pub use crate::config::{LaunchConfig, RunParameters, StageConfiguration, StageGroupConfig};
    pub use crate::core::{PhaseOutcome, PrivateComputationStatus, StageDescriptor, StagePhase};
    pub use crate::errors::{PcStageError, Result, WorkflowError};
    pub use crate::instance::{PrivateComputationInstance, PrivateComputationRole, StageRunRecord};
    pub use crate::observability::{init_tracing, LogFormat};
    pub use crate::services::{
        PassThroughStageService, StageService, StageServiceRegistry, WorkflowStageService,
    };
}
