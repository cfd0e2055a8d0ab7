//! Techo diario de horas de trabajo del conductor.

use serde_json::json;

use super::{Rule, RuleContext};
use crate::models::{ConflictCategory, ConflictFinding, TripStatus};

pub struct WorkHoursRule;

impl Rule for WorkHoursRule {
    fn name(&self) -> &'static str {
        "work_hours"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        let Some(driver) = ctx.driver else {
            return Vec::new();
        };
        let policy = ctx.policy;
        let default_duration = policy.default_trip_duration();

        // Los completados cuentan: es trabajo ya realizado ese día
        let existing_hours: f64 = ctx
            .driver_trips
            .iter()
            .filter(|trip| trip.status != TripStatus::Cancelled)
            .filter(|trip| Some(trip.id) != ctx.candidate.trip_id)
            .map(|trip| trip.estimated_hours(default_duration))
            .sum();
        let candidate_hours = ctx.candidate.window(default_duration).duration_hours();
        let total_hours = existing_hours + candidate_hours;

        let details = json!({
            "existing_hours": existing_hours,
            "candidate_hours": candidate_hours,
            "total_hours": total_hours,
            "recommended_hours": policy.recommended_daily_hours,
            "max_hours": policy.max_daily_hours,
        });

        let finding = if total_hours > policy.max_daily_hours {
            ConflictFinding::warning(
                ConflictCategory::Driver,
                "driver_hours_exceeded",
                format!(
                    "Driver {} would work {:.1} hours on {}, which exceeds the recommended limit of {} hours",
                    driver.name, total_hours, ctx.candidate.trip_date, policy.max_daily_hours
                ),
            )
        } else if total_hours > policy.recommended_daily_hours {
            ConflictFinding::warning(
                ConflictCategory::Driver,
                "driver_hours_high",
                format!(
                    "Driver {} would work {:.1} hours on {} (over {} hours)",
                    driver.name, total_hours, ctx.candidate.trip_date, policy.recommended_daily_hours
                ),
            )
        } else {
            return Vec::new();
        };

        vec![finding.with_details(details).with_entities([driver.id])]
    }
}
