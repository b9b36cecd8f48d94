//! Testing utilities for pcstage.
//!
//! This module provides:
//! - An in-memory workflow backend
//! - Instance and configuration fixtures

mod backend;
mod fixtures;

pub use backend::{InMemoryWorkflowService, StartedWorkflow};
pub use fixtures::{pid_mr_configuration, pid_mr_stage, TestInstance};
