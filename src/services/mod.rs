//! Services module
//!
//! Este módulo contiene el motor de asignación: reglas de conflicto, el
//! agregador, el oráculo de disponibilidad, la calculadora de carga de
//! trabajo y el optimizador de auto-asignación.

pub mod auto_assign_service;
pub mod availability_service;
pub mod conflict_service;
pub mod proximity;
pub mod rules;
pub mod workload_service;

pub use auto_assign_service::{AssignmentPlanner, AutoAssignService, PlanningInput};
pub use availability_service::AvailabilityService;
pub use conflict_service::{ConflictAggregator, ConflictService};
pub use proximity::{DistanceTable, NoProximity, ProximityRanker};
pub use workload_service::WorkloadService;
