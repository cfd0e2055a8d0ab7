//! Emparejamiento conductor/vehículo habitual.

use serde_json::json;

use super::{Rule, RuleContext};
use crate::models::{ConflictCategory, ConflictFinding};

pub struct VehiclePairingRule;

impl Rule for VehiclePairingRule {
    fn name(&self) -> &'static str {
        "vehicle_pairing"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        let (Some(driver), Some(vehicle_id)) = (ctx.driver, ctx.candidate.vehicle_id) else {
            return Vec::new();
        };

        match driver.usual_vehicle_id {
            Some(usual) if usual != vehicle_id => vec![ConflictFinding::warning(
                ConflictCategory::Vehicle,
                "vehicle_pairing_mismatch",
                format!("Driver {} usually drives a different vehicle", driver.name),
            )
            .with_details(json!({ "usual_vehicle_id": usual, "vehicle_id": vehicle_id }))
            .with_entities([driver.id, vehicle_id, usual])],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosteringPolicy;
    use crate::models::DriverSnapshot;
    use crate::services::rules::fixtures::*;
    use uuid::Uuid;

    #[test]
    fn test_pairing_mismatch_warns() {
        let usual = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut driver = DriverSnapshot::new(Uuid::new_v4(), "Dana");
        driver.usual_vehicle_id = Some(usual);
        let customer = customer();
        let policy = RosteringPolicy::default();

        for (vehicle_id, expected) in [(Some(other), 1), (Some(usual), 0), (None, 0)] {
            let mut candidate = candidate(customer.id, date(2025, 2, 2));
            candidate.driver_id = Some(driver.id);
            candidate.vehicle_id = vehicle_id;
            let ctx = RuleContext {
                candidate: &candidate,
                driver: Some(&driver),
                vehicle: None,
                customer: &customer,
                driver_trips: &[],
                policy: &policy,
            };
            let findings = VehiclePairingRule.evaluate(&ctx);
            assert_eq!(findings.len(), expected);
            assert!(findings.iter().all(|f| !f.is_critical()));
        }
    }
}
