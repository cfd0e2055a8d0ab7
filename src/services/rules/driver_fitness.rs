//! Aptitud del conductor: estado, permiso de conducir y certificaciones.

use serde_json::json;

use super::{Rule, RuleContext};
use crate::models::{ConflictCategory, ConflictFinding};

pub struct DriverFitnessRule;

impl Rule for DriverFitnessRule {
    fn name(&self) -> &'static str {
        "driver_fitness"
    }

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        let Some(driver) = ctx.driver else {
            return Vec::new();
        };
        let trip_date = ctx.candidate.trip_date;
        let mut findings = Vec::new();

        if !driver.is_active {
            findings.push(
                ConflictFinding::critical(
                    ConflictCategory::Driver,
                    "driver_inactive",
                    format!("Driver {} is inactive", driver.name),
                )
                .with_entities([driver.id]),
            );
        }

        if let Some(license_expiry) = driver.license_expiry {
            if trip_date > license_expiry {
                findings.push(
                    ConflictFinding::critical(
                        ConflictCategory::Driver,
                        "driver_license_expired",
                        format!("Driver {}'s licence expired on {}", driver.name, license_expiry),
                    )
                    .with_details(json!({ "license_expiry": license_expiry, "trip_date": trip_date }))
                    .with_entities([driver.id]),
                );
            }
        }

        // Las certificaciones nunca bloquean; sólo el permiso es crítico
        for cert in &driver.certifications {
            let days_until_expiry = (cert.expires_on - trip_date).num_days();
            if days_until_expiry < 0 {
                findings.push(
                    ConflictFinding::warning(
                        ConflictCategory::Driver,
                        "driver_certification_expired",
                        format!("Driver {}'s {} certification expired on {}", driver.name, cert.name, cert.expires_on),
                    )
                    .with_details(json!({ "certification": cert.name, "expires_on": cert.expires_on }))
                    .with_entities([driver.id]),
                );
            } else if days_until_expiry <= ctx.policy.certification_warning_days {
                findings.push(
                    ConflictFinding::warning(
                        ConflictCategory::Driver,
                        "driver_certification_expiring",
                        format!(
                            "Driver {}'s {} certification expires in {} day(s)",
                            driver.name, cert.name, days_until_expiry
                        ),
                    )
                    .with_details(json!({
                        "certification": cert.name,
                        "expires_on": cert.expires_on,
                        "days_until_expiry": days_until_expiry,
                    }))
                    .with_entities([driver.id]),
                );
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RosteringPolicy;
    use crate::models::{Certification, DriverSnapshot, Severity};
    use crate::services::rules::fixtures::*;
    use uuid::Uuid;

    fn run(driver: &DriverSnapshot) -> Vec<ConflictFinding> {
        let customer = customer();
        let mut candidate = candidate(customer.id, date(2025, 1, 2));
        candidate.driver_id = Some(driver.id);
        let policy = RosteringPolicy::default();
        let ctx = RuleContext {
            candidate: &candidate,
            driver: Some(driver),
            vehicle: None,
            customer: &customer,
            driver_trips: &[],
            policy: &policy,
        };
        DriverFitnessRule.evaluate(&ctx)
    }

    #[test]
    fn test_expired_license_is_critical() {
        let mut driver = DriverSnapshot::new(Uuid::new_v4(), "Dana");
        driver.license_expiry = Some(date(2025, 1, 1));
        let findings = run(&driver);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "driver_license_expired");
        assert_eq!(findings[0].severity, Severity::Critical);
        assert!(findings[0].message.contains("2025-01-01"));
        assert_eq!(findings[0].entity_ids, vec![driver.id]);
    }

    #[test]
    fn test_license_expiring_on_trip_day_is_fine() {
        let mut driver = DriverSnapshot::new(Uuid::new_v4(), "Dana");
        driver.license_expiry = Some(date(2025, 1, 2));
        assert!(run(&driver).is_empty());
    }

    #[test]
    fn test_inactive_driver_is_critical() {
        let mut driver = DriverSnapshot::new(Uuid::new_v4(), "Dana");
        driver.is_active = false;
        let findings = run(&driver);
        assert_eq!(findings[0].code, "driver_inactive");
        assert!(findings[0].is_critical());
    }

    #[test]
    fn test_certifications_only_warn() {
        let mut driver = DriverSnapshot::new(Uuid::new_v4(), "Dana");
        driver.certifications = vec![
            Certification { name: "First aid".to_string(), expires_on: date(2024, 12, 1) },
            Certification { name: "Driving assessment".to_string(), expires_on: date(2025, 1, 20) },
            Certification { name: "Safeguarding".to_string(), expires_on: date(2026, 1, 1) },
        ];
        let findings = run(&driver);
        let codes: Vec<_> = findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["driver_certification_expired", "driver_certification_expiring"]);
        assert!(findings.iter().all(|f| !f.is_critical()));
    }
}
