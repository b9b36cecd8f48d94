//! Tests for stage services against mocked and in-memory backends.

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    use crate::backend::{MockWorkflowService, WorkflowStatus};
    use crate::config::{StageConfiguration, StageGroupConfig, PID_MR_GROUP};
    use crate::core::{PrivateComputationStatus, StageDescriptor, StagePhase};
    use crate::errors::{PcStageError, WorkflowError};
    use crate::instance::{PrivateComputationRole, StageRunRecord};
    use crate::services::{
        PassThroughStageService, StageService, StageServiceRegistry, WorkflowStageService,
    };
    use crate::testing::{pid_mr_configuration, InMemoryWorkflowService, TestInstance};

    fn in_memory() -> (Arc<InMemoryWorkflowService>, WorkflowStageService) {
        let backend = Arc::new(InMemoryWorkflowService::new());
        let service = WorkflowStageService::pid_mr(backend.clone());
        (backend, service)
    }

    #[tokio::test]
    async fn test_launch_then_complete_id_matching() {
        let mut backend = MockWorkflowService::new();
        backend
            .expect_start_workflow()
            .withf(|workflow, correlation_id, run_config| {
                workflow["stateMachineArn"] == "arn:workflow:pid-mr"
                    && correlation_id.to_string() == "inst-a"
                    && run_config["instanceId"] == "inst-a"
                    && run_config["inputPath"] == "s3://test-bucket/input.csv"
                    && run_config["outputPath"] == "s3://test-bucket/output/inst-a_out_dir/pid_mr"
                    && run_config["numPartitions"] == 4
            })
            .times(1)
            .returning(|_, _, _| Ok("wf-123".to_string()));
        backend
            .expect_get_workflow_status()
            .withf(|_, run_id| run_id.to_string() == "wf-123")
            .times(1)
            .returning(|_, _| Ok(WorkflowStatus::Completed));

        let service = WorkflowStageService::pid_mr(Arc::new(backend));
        let instance = TestInstance::new()
            .with_id("inst-a")
            .in_stage(StageDescriptor::for_phase(StagePhase::IdMatching))
            .with_pid_mr_configuration()
            .build();

        let instance = service.launch(instance, None).await.unwrap();
        assert_eq!(instance.history().len(), 1);
        let record = instance.last_run_record().unwrap();
        assert_eq!(record.run_handle(), Some("wf-123"));
        assert_eq!(record.stage_name(), "ID_MATCHING");

        let status = service.status(&instance).await.unwrap();
        assert_eq!(status, PrivateComputationStatus::IdMatchingCompleted);
    }

    #[tokio::test]
    async fn test_missing_run_config_skips_backend() {
        let mut backend = MockWorkflowService::new();
        backend.expect_start_workflow().never();
        backend.expect_get_workflow_status().never();

        let configuration = StageConfiguration::new().with_group(
            PID_MR_GROUP,
            StageGroupConfig::default().with_workflow(json!({"stateMachineArn": "arn"})),
        );
        let instance = TestInstance::new()
            .with_status(PrivateComputationStatus::PidPrepareCompleted)
            .with_configuration(configuration)
            .build();
        let before = instance.clone();

        let service = WorkflowStageService::pid_mr(Arc::new(backend));
        let instance = service.launch(instance, None).await.unwrap();

        assert_eq!(instance.history().len(), 1);
        assert!(instance.last_run_record().unwrap().run_handle().is_none());
        assert_eq!(instance.status(), PrivateComputationStatus::PidPrepareCompleted);
        assert_eq!(instance.status_updated_at(), before.status_updated_at());
        assert_eq!(instance.stage_configuration(), before.stage_configuration());

        // No run to ask about: the stage reads as started.
        let status = service.status(&instance).await.unwrap();
        assert_eq!(status, PrivateComputationStatus::IdMatchingStarted);
    }

    #[tokio::test]
    async fn test_missing_group_skips_backend() {
        let (backend, service) = in_memory();
        let instance = TestInstance::new().build();

        let instance = service.launch(instance, None).await.unwrap();

        assert_eq!(backend.start_count(), 0);
        assert_eq!(instance.history().len(), 1);
        assert!(instance.last_run_record().unwrap().run_handle().is_none());
    }

    #[tokio::test]
    async fn test_empty_history_returns_instance_status() {
        let mut backend = MockWorkflowService::new();
        backend.expect_get_workflow_status().never();
        let service = WorkflowStageService::pid_mr(Arc::new(backend));

        let instance = TestInstance::new().with_pid_mr_configuration().build();
        assert_eq!(
            service.status(&instance).await.unwrap(),
            PrivateComputationStatus::Unknown
        );

        let instance = TestInstance::new()
            .with_status(PrivateComputationStatus::ProcessingRequest)
            .build();
        assert_eq!(
            service.status(&instance).await.unwrap(),
            PrivateComputationStatus::ProcessingRequest
        );
    }

    #[tokio::test]
    async fn test_stage_mismatch_is_state_corruption() {
        let (backend, service) = in_memory();
        let instance = TestInstance::new().with_pid_mr_configuration().build();
        let mut instance = service.launch(instance, None).await.unwrap();
        let handle = instance.last_run_record().unwrap().run_handle().unwrap().to_string();
        backend.set_status(&handle, WorkflowStatus::Completed);

        instance.advance_stage(StageDescriptor::for_phase(StagePhase::Reshard));

        let err = service.status(&instance).await.unwrap_err();
        assert!(err.is_fatal());
        match err {
            PcStageError::StateCorruption {
                current_stage,
                recorded_stage,
            } => {
                assert_eq!(current_stage, "RESHARD");
                assert_eq!(recorded_stage, "PID_MR");
            }
            other => panic!("expected state corruption, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_manually_appended_foreign_record_is_state_corruption() {
        let (_backend, service) = in_memory();
        let mut instance = TestInstance::new().build();
        instance.append_run_record(StageRunRecord::new("AGGREGATION"));

        let err = service.status(&instance).await.unwrap_err();
        assert!(matches!(err, PcStageError::StateCorruption { .. }));
    }

    #[tokio::test]
    async fn test_every_phase_reports_started_after_launch() {
        for phase in StagePhase::ALL {
            let (backend, service) = in_memory();
            let instance = TestInstance::new()
                .in_stage(StageDescriptor::for_phase(phase))
                .with_pid_mr_configuration()
                .build();

            let instance = service.launch(instance, None).await.unwrap();
            let handle = instance.last_run_record().unwrap().run_handle().unwrap();
            backend.set_status(handle, WorkflowStatus::Started);

            let status = service.status(&instance).await.unwrap();
            assert_eq!(status, phase.started_status(), "phase {phase}");
        }
    }

    #[tokio::test]
    async fn test_status_mapping_is_total() {
        let cases = [
            (WorkflowStatus::Unknown, PrivateComputationStatus::IdMatchingStarted),
            (WorkflowStatus::Created, PrivateComputationStatus::IdMatchingStarted),
            (WorkflowStatus::Started, PrivateComputationStatus::IdMatchingStarted),
            (WorkflowStatus::Completed, PrivateComputationStatus::IdMatchingCompleted),
            (WorkflowStatus::Failed, PrivateComputationStatus::IdMatchingFailed),
        ];

        let (backend, service) = in_memory();
        let instance = TestInstance::new().with_pid_mr_configuration().build();
        let instance = service.launch(instance, None).await.unwrap();
        let handle = instance.last_run_record().unwrap().run_handle().unwrap();

        for (workflow_status, expected) in cases {
            backend.set_status(handle, workflow_status);
            assert_eq!(service.status(&instance).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_unrecognized_backend_status_is_fatal() {
        let (backend, service) = in_memory();
        let instance = TestInstance::new().with_pid_mr_configuration().build();
        let instance = service.launch(instance, None).await.unwrap();
        let handle = instance.last_run_record().unwrap().run_handle().unwrap();
        backend.set_raw_status(handle, "SUSPENDED");

        let err = service.status(&instance).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, PcStageError::InvalidBackendStatus { ref value } if value == "SUSPENDED"));
    }

    #[tokio::test]
    async fn test_repeated_status_is_idempotent() {
        let (backend, service) = in_memory();
        let instance = TestInstance::new().with_pid_mr_configuration().build();
        let instance = service.launch(instance, None).await.unwrap();
        let handle = instance.last_run_record().unwrap().run_handle().unwrap();
        backend.set_status(handle, WorkflowStatus::Failed);

        let first = service.status(&instance).await.unwrap();
        let second = service.status(&instance).await.unwrap();
        assert_eq!(first, PrivateComputationStatus::IdMatchingFailed);
        assert_eq!(first, second);
        assert_eq!(instance.status(), PrivateComputationStatus::Unknown);
    }

    #[tokio::test]
    async fn test_fresh_run_reads_as_started() {
        let (_backend, service) = in_memory();
        let instance = TestInstance::new().with_pid_mr_configuration().build();
        let instance = service.launch(instance, None).await.unwrap();

        assert_eq!(
            service.status(&instance).await.unwrap(),
            PrivateComputationStatus::IdMatchingStarted
        );
    }

    #[tokio::test]
    async fn test_start_failure_propagates_without_record() {
        let (backend, service) = in_memory();
        backend.fail_next_start(WorkflowError::unavailable("throttled"));
        let instance = TestInstance::new().with_pid_mr_configuration().build();

        let err = service.launch(instance.clone(), None).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(instance.history().is_empty());

        let instance = service.launch(instance, None).await.unwrap();
        assert_eq!(instance.history().len(), 1);
        assert!(instance.last_run_record().unwrap().run_handle().is_some());
    }

    #[tokio::test]
    async fn test_backend_poll_failure_is_not_a_failed_status() {
        let mut backend = MockWorkflowService::new();
        backend
            .expect_start_workflow()
            .returning(|_, _, _| Ok("wf-7".to_string()));
        backend
            .expect_get_workflow_status()
            .returning(|_, _| Err(WorkflowError::unavailable("timeout")));
        let service = WorkflowStageService::pid_mr(Arc::new(backend));

        let instance = TestInstance::new().with_pid_mr_configuration().build();
        let instance = service.launch(instance, None).await.unwrap();

        let err = service.status(&instance).await.unwrap_err();
        assert!(matches!(err, PcStageError::Workflow(WorkflowError::Unavailable { .. })));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_each_launch_appends_one_record() {
        let (backend, service) = in_memory();
        backend.queue_handle("wf-1");
        backend.queue_handle("wf-2");
        let instance = TestInstance::new().with_pid_mr_configuration().build();

        let instance = service.launch(instance, None).await.unwrap();
        let instance = service.launch(instance, None).await.unwrap();

        let handles: Vec<_> = instance
            .history()
            .iter()
            .map(|record| record.run_handle().unwrap())
            .collect();
        assert_eq!(handles, vec!["wf-1", "wf-2"]);
        assert!(instance
            .history()
            .iter()
            .all(|record| record.stage_name() == "PID_MR"));
    }

    #[tokio::test]
    async fn test_partner_launch_accepts_peer_addresses() {
        let (backend, service) = in_memory();
        let instance = TestInstance::new()
            .with_role(PrivateComputationRole::Partner)
            .with_pid_mr_configuration()
            .build();
        let peers = vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()];

        let instance = service.launch(instance, Some(&peers)).await.unwrap();

        assert_eq!(instance.history().len(), 1);
        assert_eq!(backend.start_count(), 1);
        assert_eq!(backend.started()[0].correlation_id, "test-instance");
    }

    #[tokio::test]
    async fn test_record_without_handle_skips_backend_poll() {
        let mut backend = MockWorkflowService::new();
        backend.expect_get_workflow_status().never();
        let service = WorkflowStageService::pid_mr(Arc::new(backend));

        // Workflow configuration is present, but the instance id must not be
        // polled in place of the missing handle.
        let mut instance = TestInstance::new().with_pid_mr_configuration().build();
        instance.append_run_record(StageRunRecord::new("PID_MR"));
        assert!(instance.last_run_record().unwrap().run_handle().is_none());

        assert_eq!(
            service.status(&instance).await.unwrap(),
            PrivateComputationStatus::IdMatchingStarted
        );
    }

    #[tokio::test]
    async fn test_custom_group_reads_its_own_configuration() {
        let mut backend = MockWorkflowService::new();
        backend
            .expect_start_workflow()
            .withf(|workflow, _, run_config| {
                workflow["name"] == "reshard"
                    && run_config["outputPath"] == "s3://test-bucket/output/test-instance_out_dir/reshard"
            })
            .times(1)
            .returning(|_, _, _| Ok("wf-r".to_string()));
        backend
            .expect_get_workflow_status()
            .withf(|workflow, run_id| {
                workflow["name"] == "reshard" && run_id.to_string() == "wf-r"
            })
            .returning(|_, _| Ok(WorkflowStatus::Completed));

        let configuration = pid_mr_configuration().with_group(
            "reshard",
            StageGroupConfig::new(json!({"name": "reshard"}), json!({})),
        );
        let service = WorkflowStageService::new("reshard", Arc::new(backend));
        assert_eq!(service.group(), "reshard");

        let instance = TestInstance::new()
            .in_stage(StageDescriptor::for_phase(StagePhase::Reshard))
            .with_configuration(configuration)
            .build();
        let instance = service.launch(instance, None).await.unwrap();

        assert_eq!(
            service.status(&instance).await.unwrap(),
            PrivateComputationStatus::ReshardCompleted
        );
    }

    #[tokio::test]
    async fn test_instances_share_one_backend() {
        let (backend, service) = in_memory();
        let service = Arc::new(service);

        let mut tasks = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            tasks.push(tokio::spawn(async move {
                let instance = TestInstance::new()
                    .with_id(format!("inst-{i}"))
                    .with_pid_mr_configuration()
                    .build();
                service.launch(instance, None).await
            }));
        }

        let mut handles = Vec::new();
        for task in tasks {
            let instance = task.await.unwrap().unwrap();
            handles.push(instance.last_run_record().unwrap().run_handle().unwrap().to_string());
        }
        handles.sort();
        handles.dedup();

        assert_eq!(handles.len(), 8);
        assert_eq!(backend.start_count(), 8);
    }

    #[tokio::test]
    async fn test_pass_through_stage() {
        let service = PassThroughStageService::new();
        let instance = TestInstance::new()
            .in_stage(StageDescriptor::for_phase(StagePhase::PostProcessingHandlers))
            .with_status(PrivateComputationStatus::AggregationCompleted)
            .build();

        assert_eq!(
            service.status(&instance).await.unwrap(),
            PrivateComputationStatus::AggregationCompleted
        );

        let mut instance = service.launch(instance, None).await.unwrap();
        assert_eq!(instance.history().len(), 1);
        assert!(instance.last_run_record().unwrap().run_handle().is_none());
        assert_eq!(
            service.status(&instance).await.unwrap(),
            PrivateComputationStatus::PostProcessingHandlersCompleted
        );

        instance.advance_stage(StageDescriptor::for_phase(StagePhase::Aggregation));
        assert!(service.status(&instance).await.is_err());
    }

    #[tokio::test]
    async fn test_registry_drives_stages_in_sequence() {
        let backend = Arc::new(InMemoryWorkflowService::new());
        backend.queue_handle("wf-pid");
        let registry = StageServiceRegistry::new()
            .with_service("PID_MR", Arc::new(WorkflowStageService::pid_mr(backend.clone())))
            .with_service("RESHARD", Arc::new(PassThroughStageService::new()));

        let instance = TestInstance::new().with_pid_mr_configuration().build();

        let service = registry.for_instance(&instance).unwrap();
        let mut instance = service.launch(instance, None).await.unwrap();
        let status = service.status(&instance).await.unwrap();
        instance.update_status(status);
        assert_eq!(instance.status(), PrivateComputationStatus::IdMatchingStarted);

        backend.set_status("wf-pid", WorkflowStatus::Completed);
        let status = service.status(&instance).await.unwrap();
        assert!(status.is_terminal());
        instance.update_status(status);

        instance.advance_stage(StageDescriptor::for_phase(StagePhase::Reshard));
        let service = registry.for_instance(&instance).unwrap();
        let instance = service.launch(instance, None).await.unwrap();
        let status = service.status(&instance).await.unwrap();

        assert_eq!(status, PrivateComputationStatus::ReshardCompleted);
        let names: Vec<_> = instance.history().iter().map(StageRunRecord::stage_name).collect();
        assert_eq!(names, vec!["PID_MR", "RESHARD"]);
    }
}
