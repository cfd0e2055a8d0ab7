//! Preferencias del cliente: movilidad, conductores bloqueados y preferido.

use serde_json::json;

use super::{Rule, RuleContext};
use crate::models::{ConflictCategory, ConflictFinding};

pub struct CustomerPreferenceRule;

impl Rule for CustomerPreferenceRule {
    fn name(&self) -> &'static str {
        "customer_preference"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        let customer = ctx.customer;
        let mut findings = Vec::new();

        if customer.needs_wheelchair() && !ctx.candidate.requires_wheelchair {
            findings.push(
                ConflictFinding::warning(
                    ConflictCategory::Customer,
                    "customer_wheelchair_not_requested",
                    format!(
                        "{}'s mobility requirements indicate a wheelchair but the trip is not marked as requiring wheelchair access",
                        customer.name
                    ),
                )
                .with_details(json!({ "mobility_requirements": customer.mobility_requirements }))
                .with_entities([customer.id]),
            );
        }

        let Some(driver_id) = ctx.candidate.driver_id else {
            return findings;
        };

        if customer.is_blocked(driver_id) {
            findings.push(
                ConflictFinding::critical(
                    ConflictCategory::Customer,
                    "customer_driver_blocked",
                    format!("{} has blocked this driver", customer.name),
                )
                .with_details(json!({ "driver_id": driver_id }))
                .with_entities([customer.id, driver_id]),
            );
        } else if let Some(preferred) = customer.preferred_driver_id.filter(|p| *p != driver_id) {
            findings.push(
                ConflictFinding::warning(
                    ConflictCategory::Customer,
                    "customer_preferred_driver",
                    format!("{} prefers a different driver", customer.name),
                )
                .with_details(json!({ "preferred_driver_id": preferred, "driver_id": driver_id }))
                .with_entities([customer.id, driver_id, preferred]),
            );
        }

        findings
    }
}
