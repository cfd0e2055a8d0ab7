//! Aptitud del vehículo: estado, ITV, seguro, accesibilidad y plazas.

use serde_json::json;

use super::{Rule, RuleContext};
use crate::models::{ConflictCategory, ConflictFinding};

pub struct VehicleFitnessRule;

impl Rule for VehicleFitnessRule {
    fn name(&self) -> &'static str {
        "vehicle_fitness"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        let Some(vehicle) = ctx.vehicle else {
            return Vec::new();
        };
        let trip_date = ctx.candidate.trip_date;
        let mut findings = Vec::new();

        if !vehicle.is_active {
            findings.push(
                ConflictFinding::critical(
                    ConflictCategory::Vehicle,
                    "vehicle_inactive",
                    format!("Vehicle {} is inactive", vehicle.registration),
                )
                .with_entities([vehicle.id]),
            );
        }

        if let Some(mot_expiry) = vehicle.mot_expiry {
            let days_until_expiry = (mot_expiry - trip_date).num_days();
            if days_until_expiry < 0 {
                findings.push(
                    ConflictFinding::critical(
                        ConflictCategory::Vehicle,
                        "vehicle_mot_expired",
                        format!("Vehicle {} MOT expired on {}", vehicle.registration, mot_expiry),
                    )
                    .with_details(json!({ "mot_expiry": mot_expiry, "trip_date": trip_date }))
                    .with_entities([vehicle.id]),
                );
            } else if days_until_expiry <= ctx.policy.mot_warning_days {
                findings.push(
                    ConflictFinding::warning(
                        ConflictCategory::Vehicle,
                        "vehicle_mot_expiring",
                        format!(
                            "Vehicle {} MOT expires in {} day(s) on {}",
                            vehicle.registration, days_until_expiry, mot_expiry
                        ),
                    )
                    .with_details(json!({
                        "mot_expiry": mot_expiry,
                        "days_until_expiry": days_until_expiry,
                    }))
                    .with_entities([vehicle.id]),
                );
            }
        }

        if let Some(insurance_expiry) = vehicle.insurance_expiry {
            if trip_date > insurance_expiry {
                findings.push(
                    ConflictFinding::critical(
                        ConflictCategory::Vehicle,
                        "vehicle_insurance_expired",
                        format!("Vehicle {} insurance expired on {}", vehicle.registration, insurance_expiry),
                    )
                    .with_details(json!({ "insurance_expiry": insurance_expiry, "trip_date": trip_date }))
                    .with_entities([vehicle.id]),
                );
            }
        }

        if ctx.candidate.requires_wheelchair && !vehicle.wheelchair_accessible {
            findings.push(
                ConflictFinding::critical(
                    ConflictCategory::Vehicle,
                    "vehicle_not_wheelchair_accessible",
                    format!(
                        "Trip requires wheelchair access but vehicle {} is not wheelchair accessible",
                        vehicle.registration
                    ),
                )
                .with_entities([vehicle.id, ctx.customer.id]),
            );
        }

        if let (Some(passengers), Some(seats)) = (ctx.candidate.passenger_count, vehicle.seating_capacity) {
            if passengers > seats {
                findings.push(
                    ConflictFinding::critical(
                        ConflictCategory::Vehicle,
                        "vehicle_over_capacity",
                        format!(
                            "Trip has {} passenger(s) but vehicle {} seats {}",
                            passengers, vehicle.registration, seats
                        ),
                    )
                    .with_details(json!({ "passenger_count": passengers, "seating_capacity": seats }))
                    .with_entities([vehicle.id]),
                );
            }
        }

        findings
    }
}
