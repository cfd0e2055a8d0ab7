//! Modelos de disponibilidad

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Driver,
    Customer,
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driver" | "drivers" => Ok(EntityType::Driver),
            "customer" | "customers" => Ok(EntityType::Customer),
            other => Err(format!("unsupported entity type '{}'", other)),
        }
    }
}

/// Respuesta del oráculo de disponibilidad
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvailabilityResult {
    pub available: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_trip_id: Option<Uuid>,
}

impl AvailabilityResult {
    pub fn available(reason: impl Into<String>) -> Self {
        Self {
            available: true,
            reason: reason.into(),
            conflict_type: None,
            conflicting_trip_id: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>, conflict_type: &str, trip_id: Option<Uuid>) -> Self {
        Self {
            available: false,
            reason: reason.into(),
            conflict_type: Some(conflict_type.to_string()),
            conflicting_trip_id: trip_id,
        }
    }
}
