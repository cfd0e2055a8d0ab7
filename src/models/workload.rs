//! Modelos de carga de trabajo
//!
//! Métricas de utilización por conductor y su resumen.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UtilizationStatus {
    Underutilized,
    Balanced,
    Overutilized,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverWorkloadMetric {
    pub driver_id: Uuid,
    pub driver_name: Option<String>,
    pub total_hours: f64,
    pub trip_count: usize,
    pub active_days: usize,
    pub utilization_percent: f64,
    pub status: UtilizationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkloadSummary {
    pub total_drivers: usize,
    /// Media sin ponderar de la utilización de todos los conductores
    pub average_utilization: f64,
    pub underutilized: usize,
    pub overutilized: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkloadReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub metrics: Vec<DriverWorkloadMetric>,
    pub summary: WorkloadSummary,
}
