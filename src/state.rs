//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::{EnvironmentConfig, RosteringPolicy};
use crate::repositories::RosterRepository;
use crate::services::{
    AutoAssignService, AvailabilityService, ConflictService, NoProximity, ProximityRanker, WorkloadService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub policy: Arc<RosteringPolicy>,
    pub repository: Arc<dyn RosterRepository>,
    pub conflicts: ConflictService,
    pub availability: AvailabilityService,
    pub workload: WorkloadService,
    pub auto_assign: AutoAssignService,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, policy: RosteringPolicy, repository: Arc<dyn RosterRepository>) -> Self {
        Self::with_proximity(config, policy, repository, Arc::new(NoProximity))
    }

    /// Estado con una fuente de distancias para `consider_proximity`
    pub fn with_proximity(
        config: EnvironmentConfig,
        policy: RosteringPolicy,
        repository: Arc<dyn RosterRepository>,
        proximity: Arc<dyn ProximityRanker>,
    ) -> Self {
        let policy = Arc::new(policy);
        let conflicts = ConflictService::new(repository.clone(), policy.clone());

        Self {
            availability: AvailabilityService::new(repository.clone()),
            workload: WorkloadService::new(repository.clone(), policy.clone()),
            auto_assign: AutoAssignService::with_proximity(repository.clone(), conflicts.clone(), proximity),
            conflicts,
            config,
            policy,
            repository,
        }
    }
}
