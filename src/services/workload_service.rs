//! Calculadora de carga de trabajo
//!
//! Agrega horas y viajes por conductor en un rango de fechas y deriva la
//! utilización respecto al turno de referencia.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::RosteringPolicy;
use crate::models::{DriverWorkloadMetric, TripSnapshot, TripStatus, UtilizationStatus, WorkloadReport, WorkloadSummary};
use crate::repositories::RosterRepository;
use crate::utils::errors::{bad_request_error, AppResult};

/// `total_hours / (active_days * reference_shift_hours) * 100`
pub fn utilization_percent(total_hours: f64, active_days: usize, policy: &RosteringPolicy) -> f64 {
    if active_days == 0 {
        return 0.0;
    }
    total_hours / (active_days as f64 * policy.reference_shift_hours) * 100.0
}

pub fn classify_utilization(utilization: f64, policy: &RosteringPolicy) -> UtilizationStatus {
    if utilization < policy.underutilized_percent {
        UtilizationStatus::Underutilized
    } else if utilization > policy.overutilized_percent {
        UtilizationStatus::Overutilized
    } else {
        UtilizationStatus::Balanced
    }
}

#[derive(Default)]
struct DriverAccumulator {
    total_hours: f64,
    trip_count: usize,
    days: BTreeSet<NaiveDate>,
}

/// Cálculo puro sobre los viajes ya leídos; ignora cancelados y no asignados
pub fn summarize_workload(
    trips: &[TripSnapshot],
    driver_names: &HashMap<Uuid, String>,
    policy: &RosteringPolicy,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> WorkloadReport {
    let default_duration = policy.default_trip_duration();
    let mut by_driver: BTreeMap<Uuid, DriverAccumulator> = BTreeMap::new();

    for trip in trips
        .iter()
        .filter(|t| t.status != TripStatus::Cancelled)
        .filter(|t| t.trip_date >= start_date && t.trip_date <= end_date)
    {
        let Some(driver_id) = trip.driver_id else {
            continue;
        };
        let acc = by_driver.entry(driver_id).or_default();
        acc.total_hours += trip.estimated_hours(default_duration);
        acc.trip_count += 1;
        acc.days.insert(trip.trip_date);
    }

    let mut metrics: Vec<DriverWorkloadMetric> = by_driver
        .into_iter()
        .map(|(driver_id, acc)| {
            let active_days = acc.days.len();
            let utilization = utilization_percent(acc.total_hours, active_days, policy);
            DriverWorkloadMetric {
                driver_id,
                driver_name: driver_names.get(&driver_id).cloned(),
                total_hours: acc.total_hours,
                trip_count: acc.trip_count,
                active_days,
                utilization_percent: utilization,
                status: classify_utilization(utilization, policy),
            }
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.utilization_percent
            .total_cmp(&a.utilization_percent)
            .then_with(|| a.driver_id.cmp(&b.driver_id))
    });

    let total_drivers = metrics.len();
    let average_utilization = if total_drivers == 0 {
        0.0
    } else {
        metrics.iter().map(|m| m.utilization_percent).sum::<f64>() / total_drivers as f64
    };

    let summary = WorkloadSummary {
        total_drivers,
        average_utilization,
        underutilized: metrics
            .iter()
            .filter(|m| m.status == UtilizationStatus::Underutilized)
            .count(),
        overutilized: metrics
            .iter()
            .filter(|m| m.status == UtilizationStatus::Overutilized)
            .count(),
    };

    WorkloadReport {
        start_date,
        end_date,
        metrics,
        summary,
    }
}

#[derive(Clone)]
pub struct WorkloadService {
    repository: Arc<dyn RosterRepository>,
    policy: Arc<RosteringPolicy>,
}

impl WorkloadService {
    pub fn new(repository: Arc<dyn RosterRepository>, policy: Arc<RosteringPolicy>) -> Self {
        Self { repository, policy }
    }

    pub async fn calculate_workload(&self, tenant_id: Uuid, start_date: NaiveDate, end_date: NaiveDate) -> AppResult<WorkloadReport> {
        if end_date < start_date {
            return Err(bad_request_error("end date must not be before start date"));
        }

        let trips = self.repository.trips_in_range(tenant_id, start_date, end_date).await?;
        let driver_names: HashMap<Uuid, String> = self
            .repository
            .list_drivers(tenant_id)
            .await?
            .into_iter()
            .map(|d| (d.id, d.name))
            .collect();

        let report = summarize_workload(&trips, &driver_names, &self.policy, start_date, end_date);
        info!(
            "📊 Carga de trabajo tenant={} {}..{}: {} conductor(es), media {:.1}%",
            tenant_id, start_date, end_date, report.summary.total_drivers, report.summary.average_utilization
        );
        Ok(report)
    }
}
