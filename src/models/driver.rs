//! Modelo de Driver
//!
//! Instantánea del conductor con los campos que necesitan las reglas.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Certificación con fecha de vencimiento (evaluación de conducción, primeros auxilios...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Certification {
    pub name: String,
    pub expires_on: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverSnapshot {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub license_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    /// Vehículo asignado habitualmente
    pub usual_vehicle_id: Option<Uuid>,
}

impl DriverSnapshot {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_active: true,
            license_expiry: None,
            certifications: Vec::new(),
            usual_vehicle_id: None,
        }
    }
}
