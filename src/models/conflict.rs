//! Modelos de conflictos
//!
//! Hallazgos producidos por las reglas y el informe agregado que decide
//! si una asignación se puede guardar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Bloquea la asignación
    Critical,
    /// Informativo, para revisión humana
    Warning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConflictCategory {
    Vehicle,
    Driver,
    Customer,
    Scheduling,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConflictFinding {
    pub severity: Severity,
    pub category: ConflictCategory,
    /// Identificador estable de la regla que lo produjo, p.ej. `vehicle_mot_expired`
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    pub entity_ids: Vec<Uuid>,
}

impl ConflictFinding {
    pub fn critical(category: ConflictCategory, code: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, category, code, message)
    }

    pub fn warning(category: ConflictCategory, code: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, code, message)
    }

    fn new(severity: Severity, category: ConflictCategory, code: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            category,
            code: code.to_string(),
            message: message.into(),
            details: serde_json::Value::Null,
            entity_ids: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn with_entities(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.entity_ids.extend(ids);
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Resultado de `check_conflicts`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConflictReport {
    pub findings: Vec<ConflictFinding>,
    pub has_critical_conflicts: bool,
    pub can_proceed: bool,
    pub message: String,
}

impl ConflictReport {
    pub fn from_findings(findings: Vec<ConflictFinding>) -> Self {
        let critical = findings.iter().filter(|f| f.is_critical()).count();
        let warnings = findings.len() - critical;

        let message = match (critical, warnings) {
            (0, 0) => "No conflicts detected".to_string(),
            (0, w) => format!("{} warning(s) to review; assignment can proceed", w),
            (c, 0) => format!("{} critical conflict(s) must be resolved", c),
            (c, w) => format!(
                "{} critical conflict(s) must be resolved and {} warning(s) to review",
                c, w
            ),
        };

        Self {
            has_critical_conflicts: critical > 0,
            can_proceed: critical == 0,
            findings,
            message,
        }
    }

    pub fn critical_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_critical()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings.len() - self.critical_count()
    }
}

/// Informe de un viaje existente dentro de un escaneo por rango de fechas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripConflictReport {
    pub trip_id: Uuid,
    pub trip_date: NaiveDate,
    pub report: ConflictReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_without_findings() {
        let report = ConflictReport::from_findings(Vec::new());
        assert!(report.can_proceed);
        assert!(!report.has_critical_conflicts);
        assert_eq!(report.message, "No conflicts detected");
    }

    #[test]
    fn test_warnings_never_block() {
        let report = ConflictReport::from_findings(vec![
            ConflictFinding::warning(ConflictCategory::Driver, "a", "one"),
            ConflictFinding::warning(ConflictCategory::Vehicle, "b", "two"),
        ]);
        assert!(report.can_proceed);
        assert_eq!(report.warning_count(), 2);
    }

    #[test]
    fn test_single_critical_blocks() {
        let report = ConflictReport::from_findings(vec![
            ConflictFinding::warning(ConflictCategory::Driver, "a", "one"),
            ConflictFinding::critical(ConflictCategory::Customer, "b", "two"),
        ]);
        assert!(!report.can_proceed);
        assert!(report.has_critical_conflicts);
        assert_eq!(report.critical_count(), 1);
        assert!(report.message.starts_with("1 critical"));
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_value(Severity::Critical).unwrap();
        assert_eq!(json, serde_json::json!("critical"));
        let json = serde_json::to_value(ConflictCategory::Scheduling).unwrap();
        assert_eq!(json, serde_json::json!("scheduling"));
    }
}
