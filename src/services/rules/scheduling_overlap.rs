//! Solapamiento de horarios del conductor en la misma fecha.

use serde_json::json;

use super::{Rule, RuleContext};
use crate::models::{ConflictCategory, ConflictFinding};

pub struct SchedulingOverlapRule;

impl Rule for SchedulingOverlapRule {
    fn name(&self) -> &'static str {
        "scheduling_overlap"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        let Some(driver) = ctx.driver else {
            return Vec::new();
        };
        let default_duration = ctx.policy.default_trip_duration();
        let window = ctx.candidate.window(default_duration);

        ctx.driver_trips
            .iter()
            .filter(|trip| trip.status.occupies_schedule())
            .filter(|trip| Some(trip.id) != ctx.candidate.trip_id)
            .filter_map(|trip| trip.window(default_duration).map(|w| (trip, w)))
            .filter(|(_, other)| window.overlaps(other))
            .map(|(trip, other)| {
                ConflictFinding::critical(
                    ConflictCategory::Scheduling,
                    "scheduling_overlap",
                    format!(
                        "Driver {} already has a trip for {} at {}",
                        driver.name,
                        trip.label(),
                        other
                    ),
                )
                .with_details(json!({
                    "conflicting_trip_id": trip.id,
                    "conflicting_customer": trip.label(),
                    "conflicting_window": other.to_string(),
                    "candidate_window": window.to_string(),
                }))
                .with_entities([driver.id, trip.id])
            })
            .collect()
    }
}
