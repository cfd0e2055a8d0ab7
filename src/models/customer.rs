//! Modelo de Customer
//!
//! Instantánea del cliente: requisitos de movilidad y preferencias de conductor.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

lazy_static! {
    static ref WHEELCHAIR_PATTERN: Regex =
        Regex::new(r"(?i)\bwheel\s*-?\s*chair|\bwchr?\b|\bpower\s*chair").unwrap();
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerSnapshot {
    pub id: Uuid,
    pub name: String,
    /// Texto libre de movilidad/accesibilidad
    pub mobility_requirements: Option<String>,
    #[serde(default)]
    pub wheelchair_user: bool,
    pub preferred_driver_id: Option<Uuid>,
    #[serde(default)]
    pub blocked_driver_ids: Vec<Uuid>,
}

impl CustomerSnapshot {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            mobility_requirements: None,
            wheelchair_user: false,
            preferred_driver_id: None,
            blocked_driver_ids: Vec::new(),
        }
    }

    /// El cliente necesita silla de ruedas según el flag o el texto de movilidad
    pub fn needs_wheelchair(&self) -> bool {
        self.wheelchair_user
            || self
                .mobility_requirements
                .as_deref()
                .map(|text| WHEELCHAIR_PATTERN.is_match(text))
                .unwrap_or(false)
    }

    pub fn is_blocked(&self, driver_id: Uuid) -> bool {
        self.blocked_driver_ids.contains(&driver_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_text(text: &str) -> CustomerSnapshot {
        CustomerSnapshot {
            mobility_requirements: Some(text.to_string()),
            ..CustomerSnapshot::new(Uuid::new_v4(), "Test")
        }
    }

    #[test]
    fn test_wheelchair_text_detection() {
        assert!(with_text("Uses a wheelchair").needs_wheelchair());
        assert!(with_text("WHEEL CHAIR user, needs ramp").needs_wheelchair());
        assert!(with_text("wheel-chair").needs_wheelchair());
        assert!(with_text("Power chair").needs_wheelchair());
        assert!(!with_text("Walking frame only").needs_wheelchair());
        assert!(!CustomerSnapshot::new(Uuid::new_v4(), "Nobody").needs_wheelchair());
    }

    #[test]
    fn test_wheelchair_flag() {
        let mut customer = CustomerSnapshot::new(Uuid::new_v4(), "Flagged");
        customer.wheelchair_user = true;
        assert!(customer.needs_wheelchair());
    }
}
