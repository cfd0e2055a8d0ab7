//! Modelos de auto-asignación
//!
//! Opciones del optimizador, propuestas tentativas y resultado de aplicarlas.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoAssignOptions {
    #[serde(default = "default_true")]
    pub balance_workload: bool,
    #[serde(default)]
    pub consider_proximity: bool,
    /// Sin límite cuando es `None`
    #[serde(default)]
    pub max_assignments: Option<usize>,
}

pub(crate) fn default_true() -> bool {
    true
}

impl Default for AutoAssignOptions {
    fn default() -> Self {
        Self {
            balance_workload: true,
            consider_proximity: false,
            max_assignments: None,
        }
    }
}

/// Asignación tentativa conductor → viaje, aún no guardada
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssignmentProposal {
    pub trip_id: Uuid,
    pub driver_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    /// Versión del viaje contra la que se calculó la propuesta
    pub trip_version: i32,
    /// Utilización proyectada del conductor tras la asignación (menor es mejor)
    pub score: f64,
    pub rationale: String,
    #[serde(default)]
    pub warning_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnassignedTrip {
    pub trip_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutoAssignResult {
    pub date: NaiveDate,
    pub assignments: Vec<AssignmentProposal>,
    pub unassigned: Vec<UnassignedTrip>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectedProposal {
    pub trip_id: Uuid,
    pub reason: String,
}

/// Resultado del paso explícito de aplicar propuestas
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApplyResult {
    pub applied: Vec<Uuid>,
    pub rejected: Vec<RejectedProposal>,
}
