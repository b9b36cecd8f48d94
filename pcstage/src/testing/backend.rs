//! In-memory workflow backend.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::backend::{WorkflowService, WorkflowStatus};
use crate::errors::WorkflowError;

/// A recorded `start_workflow` call.
#[derive(Debug, Clone, PartialEq)]
pub struct StartedWorkflow {
    /// Handle returned for the run.
    pub run_id: String,
    /// Workflow definition passed in.
    pub workflow_config: serde_json::Value,
    /// Correlation id passed in.
    pub correlation_id: String,
    /// Run configuration passed in.
    pub run_config: serde_json::Value,
}

/// A workflow backend that keeps runs in memory.
///
/// Runs start out `CREATED`. Tests move them along with [`Self::set_status`],
/// or feed raw wire strings with [`Self::set_raw_status`] to exercise the
/// status parser. Safe to share between services and tasks.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowService {
    statuses: DashMap<String, String>,
    started: Mutex<Vec<StartedWorkflow>>,
    next_handles: Mutex<VecDeque<String>>,
    start_error: Mutex<Option<WorkflowError>>,
}

impl InMemoryWorkflowService {
    /// Creates a new empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the handle returned by the next `start_workflow` call.
    ///
    /// Without a queued handle, a fresh `wf-<uuid>` handle is generated.
    pub fn queue_handle(&self, handle: impl Into<String>) {
        self.next_handles.lock().push_back(handle.into());
    }

    /// Makes the next `start_workflow` call fail with `error`.
    pub fn fail_next_start(&self, error: WorkflowError) {
        *self.start_error.lock() = Some(error);
    }

    /// Sets the status of a run.
    pub fn set_status(&self, run_id: &str, status: WorkflowStatus) {
        self.statuses.insert(run_id.to_string(), status.as_str().to_string());
    }

    /// Sets the raw status string a run reports.
    pub fn set_raw_status(&self, run_id: &str, status: impl Into<String>) {
        self.statuses.insert(run_id.to_string(), status.into());
    }

    /// Returns every recorded `start_workflow` call, oldest first.
    #[must_use]
    pub fn started(&self) -> Vec<StartedWorkflow> {
        self.started.lock().clone()
    }

    /// Returns the number of runs started.
    #[must_use]
    pub fn start_count(&self) -> usize {
        self.started.lock().len()
    }
}

#[async_trait]
impl WorkflowService for InMemoryWorkflowService {
    async fn start_workflow(
        &self,
        workflow_config: &serde_json::Value,
        correlation_id: &str,
        run_config: &serde_json::Value,
    ) -> Result<String, WorkflowError> {
        if let Some(err) = self.start_error.lock().take() {
            return Err(err);
        }

        let run_id = self
            .next_handles
            .lock()
            .pop_front()
            .unwrap_or_else(|| format!("wf-{}", uuid::Uuid::new_v4()));

        self.set_status(&run_id, WorkflowStatus::Created);
        self.started.lock().push(StartedWorkflow {
            run_id: run_id.clone(),
            workflow_config: workflow_config.clone(),
            correlation_id: correlation_id.to_string(),
            run_config: run_config.clone(),
        });
        Ok(run_id)
    }

    async fn get_workflow_status(
        &self,
        _workflow_config: &serde_json::Value,
        run_id: &str,
    ) -> Result<WorkflowStatus, WorkflowError> {
        let raw = self
            .statuses
            .get(run_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| WorkflowError::unknown_run(run_id))?;
        raw.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_start_records_call_and_reports_created() {
        let backend = InMemoryWorkflowService::new();
        backend.queue_handle("wf-123");

        let run_id = backend
            .start_workflow(&json!({"wf": 1}), "inst-1", &json!({"a": 1}))
            .await
            .unwrap();

        assert_eq!(run_id, "wf-123");
        assert_eq!(backend.start_count(), 1);
        assert_eq!(backend.started()[0].correlation_id, "inst-1");
        assert_eq!(
            backend.get_workflow_status(&json!({}), "wf-123").await.unwrap(),
            WorkflowStatus::Created
        );
    }

    #[tokio::test]
    async fn test_generated_handles_are_unique() {
        let backend = InMemoryWorkflowService::new();
        let a = backend.start_workflow(&json!({}), "a", &json!({})).await.unwrap();
        let b = backend.start_workflow(&json!({}), "b", &json!({})).await.unwrap();

        assert!(a.starts_with("wf-"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_unknown_run() {
        let backend = InMemoryWorkflowService::new();
        let err = backend.get_workflow_status(&json!({}), "nope").await.unwrap_err();
        assert_eq!(err, WorkflowError::unknown_run("nope"));
    }

    #[tokio::test]
    async fn test_raw_status_is_parsed() {
        let backend = InMemoryWorkflowService::new();
        backend.set_raw_status("wf-1", "COMPLETED");
        assert_eq!(
            backend.get_workflow_status(&json!({}), "wf-1").await.unwrap(),
            WorkflowStatus::Completed
        );

        backend.set_raw_status("wf-1", "PAUSED");
        let err = backend.get_workflow_status(&json!({}), "wf-1").await.unwrap_err();
        assert!(matches!(err, WorkflowError::UnrecognizedStatus { .. }));
    }

    #[tokio::test]
    async fn test_fail_next_start_only_once() {
        let backend = InMemoryWorkflowService::new();
        backend.fail_next_start(WorkflowError::unavailable("down"));

        assert!(backend.start_workflow(&json!({}), "a", &json!({})).await.is_err());
        assert!(backend.start_workflow(&json!({}), "a", &json!({})).await.is_ok());
        assert_eq!(backend.start_count(), 1);
    }
}
