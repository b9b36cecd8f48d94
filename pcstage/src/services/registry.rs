//! Registry of stage services keyed by stage name.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::StageService;
use crate::errors::{PcStageError, Result};
use crate::instance::PrivateComputationInstance;

/// Maps stage names to the service that runs them.
#[derive(Default)]
pub struct StageServiceRegistry {
    services: RwLock<HashMap<String, Arc<dyn StageService>>>,
}

impl StageServiceRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the service for a stage, replacing any previous one.
    pub fn register(&self, stage_name: impl Into<String>, service: Arc<dyn StageService>) {
        self.services.write().insert(stage_name.into(), service);
    }

    /// Registers a service, builder style.
    #[must_use]
    pub fn with_service(self, stage_name: impl Into<String>, service: Arc<dyn StageService>) -> Self {
        self.register(stage_name, service);
        self
    }

    /// Gets the service for a stage.
    pub fn get(&self, stage_name: &str) -> Result<Arc<dyn StageService>> {
        self.services
            .read()
            .get(stage_name)
            .cloned()
            .ok_or_else(|| PcStageError::unknown_stage(stage_name))
    }

    /// Gets the service for an instance's current stage.
    pub fn for_instance(&self, instance: &PrivateComputationInstance) -> Result<Arc<dyn StageService>> {
        self.get(instance.current_stage().name())
    }

    /// Checks if a stage has a service.
    #[must_use]
    pub fn contains(&self, stage_name: &str) -> bool {
        self.services.read().contains_key(stage_name)
    }

    /// Lists registered stage names, sorted.
    pub fn stage_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for StageServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageServiceRegistry")
            .field("stages", &self.stage_names())
            .finish()
    }
}
