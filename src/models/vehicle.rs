//! Modelo de Vehicle
//!
//! Instantánea del vehículo: estado, vencimientos y capacidades.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleSnapshot {
    pub id: Uuid,
    pub registration: String,
    pub is_active: bool,
    /// Vencimiento de la ITV (MOT)
    pub mot_expiry: Option<NaiveDate>,
    pub insurance_expiry: Option<NaiveDate>,
    pub wheelchair_accessible: bool,
    pub seating_capacity: Option<u32>,
}

impl VehicleSnapshot {
    pub fn new(id: Uuid, registration: impl Into<String>) -> Self {
        Self {
            id,
            registration: registration.into(),
            is_active: true,
            mot_expiry: None,
            insurance_expiry: None,
            wheelchair_accessible: false,
            seating_capacity: None,
        }
    }
}
