//! Stage configuration.
//!
//! An instance carries one [`StageGroupConfig`] per stage group (for example
//! `pid_mr`). Each group holds a workflow definition and a run template for
//! the backend. A group can only be launched when both are present; that
//! check is [`StageConfiguration::launch_config`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::Result;

/// Group key of the PID MapReduce match stage.
pub const PID_MR_GROUP: &str = "pid_mr";

/// Run configuration key carrying the instance input path.
pub const INPUT_PATH_KEY: &str = "inputPath";
/// Run configuration key carrying the stage output path.
pub const OUTPUT_PATH_KEY: &str = "outputPath";
/// Run configuration key carrying the instance id.
pub const INSTANCE_ID_KEY: &str = "instanceId";

/// Backend sub-configurations of one stage group.
///
/// Both the current keys (`WorkflowConfigs`, `RunConfigs`) and the legacy
/// `PID`-prefixed keys are accepted. When a group carries both, the current
/// key wins. Serialization always writes the current keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStageGroupConfig")]
pub struct StageGroupConfig {
    /// Workflow definition handed to the backend.
    #[serde(rename = "WorkflowConfigs", skip_serializing_if = "Option::is_none")]
    pub workflow: Option<serde_json::Value>,
    /// Run-specific parameter template.
    #[serde(rename = "RunConfigs", skip_serializing_if = "Option::is_none")]
    pub run: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct RawStageGroupConfig {
    #[serde(default, rename = "WorkflowConfigs")]
    workflow: Option<serde_json::Value>,
    #[serde(default, rename = "PIDWorkflowConfigs")]
    legacy_workflow: Option<serde_json::Value>,
    #[serde(default, rename = "RunConfigs")]
    run: Option<serde_json::Value>,
    #[serde(default, rename = "PIDRunConfigs")]
    legacy_run: Option<serde_json::Value>,
}

impl From<RawStageGroupConfig> for StageGroupConfig {
    fn from(raw: RawStageGroupConfig) -> Self {
        Self {
            workflow: raw.workflow.or(raw.legacy_workflow),
            run: raw.run.or(raw.legacy_run),
        }
    }
}

impl StageGroupConfig {
    /// Creates a group config with both sub-configurations.
    #[must_use]
    pub fn new(workflow: serde_json::Value, run: serde_json::Value) -> Self {
        Self {
            workflow: Some(workflow),
            run: Some(run),
        }
    }

    /// Sets the workflow definition.
    #[must_use]
    pub fn with_workflow(mut self, workflow: serde_json::Value) -> Self {
        self.workflow = Some(workflow);
        self
    }

    /// Sets the run template.
    #[must_use]
    pub fn with_run(mut self, run: serde_json::Value) -> Self {
        self.run = Some(run);
        self
    }
}

/// Stage configuration keyed by stage group.
///
/// Next to the groups, a configuration may carry the runtime fields
/// `inputPath`, `outputPath` and `instanceId` at the top level. They are
/// loaded and kept, but launches never write them back; the run
/// configuration sent to the backend gets its own copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageConfiguration {
    #[serde(
        default,
        rename = "inputPath",
        skip_serializing_if = "Option::is_none"
    )]
    input_path: Option<String>,
    #[serde(
        default,
        rename = "outputPath",
        skip_serializing_if = "Option::is_none"
    )]
    output_path: Option<String>,
    #[serde(
        default,
        rename = "instanceId",
        skip_serializing_if = "Option::is_none"
    )]
    instance_id: Option<String>,
    #[serde(flatten)]
    groups: BTreeMap<String, StageGroupConfig>,
}

impl StageConfiguration {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a group.
    #[must_use]
    pub fn with_group(mut self, key: impl Into<String>, group: StageGroupConfig) -> Self {
        self.groups.insert(key.into(), group);
        self
    }

    /// Sets the top-level runtime fields.
    #[must_use]
    pub fn with_runtime_parameters(mut self, params: &RunParameters) -> Self {
        self.input_path = Some(params.input_path.clone());
        self.output_path = Some(params.output_path.clone());
        self.instance_id = Some(params.instance_id.clone());
        self
    }

    /// Returns the top-level runtime fields, if all three are present.
    #[must_use]
    pub fn runtime_parameters(&self) -> Option<RunParameters> {
        match (&self.input_path, &self.output_path, &self.instance_id) {
            (Some(input_path), Some(output_path), Some(instance_id)) => Some(RunParameters {
                input_path: input_path.clone(),
                output_path: output_path.clone(),
                instance_id: instance_id.clone(),
            }),
            _ => None,
        }
    }

    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a configuration from a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Reads a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Returns a group, if configured.
    #[must_use]
    pub fn group(&self, key: &str) -> Option<&StageGroupConfig> {
        self.groups.get(key)
    }

    /// Returns true if no group is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Returns the workflow definition of a group.
    #[must_use]
    pub fn workflow_config(&self, key: &str) -> Option<&serde_json::Value> {
        self.group(key).and_then(|group| group.workflow.as_ref())
    }

    /// Returns the launch configuration of a group, or `None` unless both
    /// the workflow definition and the run template are present.
    #[must_use]
    pub fn launch_config(&self, key: &str) -> Option<LaunchConfig<'_>> {
        let group = self.group(key)?;
        match (&group.workflow, &group.run) {
            (Some(workflow), Some(run)) => Some(LaunchConfig { workflow, run }),
            _ => None,
        }
    }
}

/// A group configuration complete enough to start a backend run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchConfig<'a> {
    /// Workflow definition.
    pub workflow: &'a serde_json::Value,
    /// Run template.
    pub run: &'a serde_json::Value,
}

impl LaunchConfig<'_> {
    /// Builds the run configuration sent to the backend.
    ///
    /// Object templates get the runtime parameters merged in, overriding
    /// keys of the same name. Other templates are kept under `template`.
    #[must_use]
    pub fn run_configuration(&self, params: &RunParameters) -> serde_json::Value {
        let mut config = match self.run {
            serde_json::Value::Object(map) => map.clone(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("template".to_string(), other.clone());
                map
            }
        };
        config.insert(
            INPUT_PATH_KEY.to_string(),
            serde_json::Value::String(params.input_path.clone()),
        );
        config.insert(
            OUTPUT_PATH_KEY.to_string(),
            serde_json::Value::String(params.output_path.clone()),
        );
        config.insert(
            INSTANCE_ID_KEY.to_string(),
            serde_json::Value::String(params.instance_id.clone()),
        );
        serde_json::Value::Object(config)
    }
}

/// Runtime parameters injected into a run configuration at launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParameters {
    /// Instance input path.
    pub input_path: String,
    /// Stage-specific output path.
    pub output_path: String,
    /// Instance id.
    pub instance_id: String,
}
