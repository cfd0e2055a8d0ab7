//! DTOs del motor de asignación

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{AssignmentProposal, AutoAssignOptions, TripCandidate, TripConflictReport};
use crate::utils::errors::{validation_error, AppResult};

/// Request para verificar conflictos antes de guardar un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CheckConflictsRequest {
    pub trip_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub vehicle_id: Option<Uuid>,

    #[validate(required)]
    pub customer_id: Option<Uuid>,

    #[validate(required)]
    pub trip_date: Option<NaiveDate>,

    #[validate(required)]
    pub pickup_time: Option<NaiveTime>,

    pub return_time: Option<NaiveTime>,

    #[serde(default)]
    pub requires_wheelchair: bool,

    #[validate(range(min = 1, max = 100))]
    pub passenger_count: Option<u32>,
}

impl CheckConflictsRequest {
    /// Validar y convertir en candidato; se rechaza antes de evaluar reglas
    pub fn into_candidate(self) -> AppResult<TripCandidate> {
        self.validate()?;

        Ok(TripCandidate {
            trip_id: self.trip_id,
            driver_id: self.driver_id,
            vehicle_id: self.vehicle_id,
            customer_id: self
                .customer_id
                .ok_or_else(|| validation_error("customer_id", "customer_id is required"))?,
            trip_date: self
                .trip_date
                .ok_or_else(|| validation_error("trip_date", "trip_date is required"))?,
            pickup_time: self
                .pickup_time
                .ok_or_else(|| validation_error("pickup_time", "pickup_time is required"))?,
            return_time: self.return_time,
            requires_wheelchair: self.requires_wheelchair,
            passenger_count: self.passenger_count,
        })
    }
}

/// Query `?start=YYYY-MM-DD&end=YYYY-MM-DD`
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

/// Request de auto-asignación
#[derive(Debug, Deserialize, Validate)]
pub struct AutoAssignRequest {
    pub date: NaiveDate,

    #[serde(default = "crate::models::assignment::default_true")]
    pub balance_workload: bool,

    /// Sólo reordena candidatos si el estado tiene un `ProximityRanker`;
    /// con `NoProximity` (el servidor por defecto) no cambia nada
    #[serde(default)]
    pub consider_proximity: bool,

    #[validate(range(min = 1, max = 10000))]
    pub max_assignments: Option<usize>,
}

impl AutoAssignRequest {
    pub fn options(&self) -> AutoAssignOptions {
        AutoAssignOptions {
            balance_workload: self.balance_workload,
            consider_proximity: self.consider_proximity,
            max_assignments: self.max_assignments,
        }
    }
}

/// Request para guardar propuestas del optimizador
#[derive(Debug, Deserialize, Validate)]
pub struct ApplyAssignmentsRequest {
    #[validate(length(min = 1, max = 10000))]
    pub proposals: Vec<AssignmentProposal>,
}

#[derive(Debug, Serialize)]
pub struct ConflictScanResponse {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub trips_with_findings: usize,
    pub trips: Vec<TripConflictReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::AppError;
    use serde_json::json;

    #[test]
    fn test_missing_customer_is_validation_error() {
        let request: CheckConflictsRequest = serde_json::from_value(json!({
            "trip_date": "2025-01-02",
            "pickup_time": "09:00:00"
        }))
        .unwrap();
        assert!(matches!(request.into_candidate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_complete_request_converts() {
        let customer_id = Uuid::new_v4();
        let request: CheckConflictsRequest = serde_json::from_value(json!({
            "customer_id": customer_id,
            "trip_date": "2025-01-02",
            "pickup_time": "09:00:00",
            "return_time": "11:30:00",
            "requires_wheelchair": true
        }))
        .unwrap();
        let candidate = request.into_candidate().unwrap();
        assert_eq!(candidate.customer_id, customer_id);
        assert!(candidate.requires_wheelchair);
        assert!(candidate.driver_id.is_none());
    }

    #[test]
    fn test_auto_assign_defaults() {
        let request: AutoAssignRequest = serde_json::from_value(json!({ "date": "2025-01-02" })).unwrap();
        let options = request.options();
        assert!(options.balance_workload);
        assert!(!options.consider_proximity);
        assert_eq!(options.max_assignments, None);
    }
}
