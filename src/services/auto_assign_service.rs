//! Optimizador de auto-asignación
//!
//! Propone conductores para los viajes sin asignar de un día, respetando las
//! restricciones críticas del agregador y balanceando la carga. Nunca escribe:
//! las propuestas se guardan en un paso explícito (`apply_proposals`).

use chrono::{Duration, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RosteringPolicy;
use crate::models::{
    ApplyResult, AssignmentProposal, AutoAssignOptions, AutoAssignResult, CustomerSnapshot, DriverSnapshot,
    RejectedProposal, TripCandidate, TripSnapshot, TripStatus, UnassignedTrip, VehicleSnapshot, WorkloadReport,
};
use crate::repositories::RosterRepository;
use crate::services::conflict_service::{ConflictAggregator, ConflictService};
use crate::services::proximity::{compare_hints, NoProximity, ProximityRanker};
use crate::services::rules::RuleContext;
use crate::services::workload_service::{summarize_workload, utilization_percent};
use crate::utils::errors::{bad_request_error, AppResult};

pub const REASON_MISSING_PICKUP: &str = "missing pickup time";
pub const REASON_CUSTOMER_NOT_FOUND: &str = "customer not found";
pub const REASON_MAX_REACHED: &str = "maximum assignments reached";
pub const REASON_NOT_SCHEDULED: &str = "trip is not scheduled";

/// Datos ya leídos del repositorio para planificar un día
pub struct PlanningInput<'a> {
    pub date: NaiveDate,
    pub day_trips: &'a [TripSnapshot],
    /// Conductores activos en orden de listado
    pub drivers: &'a [DriverSnapshot],
    pub customers: &'a HashMap<Uuid, CustomerSnapshot>,
    pub vehicles: &'a HashMap<Uuid, VehicleSnapshot>,
    /// Carga histórica que pondera el balanceo
    pub history: &'a WorkloadReport,
}

struct EligibleDriver {
    order: usize,
    driver_id: Uuid,
    vehicle_id: Option<Uuid>,
    projected_utilization: f64,
    hint: Option<f64>,
    warning_count: usize,
}

/// Planificador voraz: viajes por hora de recogida, primer candidato elegible
/// o el de menor utilización proyectada.
pub struct AssignmentPlanner<'a> {
    policy: &'a RosteringPolicy,
    aggregator: &'a ConflictAggregator,
    proximity: &'a dyn ProximityRanker,
    options: &'a AutoAssignOptions,
}

impl<'a> AssignmentPlanner<'a> {
    pub fn new(
        policy: &'a RosteringPolicy,
        aggregator: &'a ConflictAggregator,
        proximity: &'a dyn ProximityRanker,
        options: &'a AutoAssignOptions,
    ) -> Self {
        Self {
            policy,
            aggregator,
            proximity,
            options,
        }
    }

    pub fn plan(&self, input: &PlanningInput<'_>) -> AutoAssignResult {
        let default_duration = self.policy.default_trip_duration();

        // Ocupación del día por conductor; incluye las asignaciones tentativas
        let mut occupancy: HashMap<Uuid, Vec<TripSnapshot>> = HashMap::new();
        for trip in input.day_trips.iter().filter(|t| t.trip_date == input.date) {
            if let Some(driver_id) = trip.driver_id {
                occupancy.entry(driver_id).or_default().push(trip.clone());
            }
        }

        let history: HashMap<Uuid, (f64, usize)> = input
            .history
            .metrics
            .iter()
            .map(|m| (m.driver_id, (m.total_hours, m.active_days)))
            .collect();
        let mut tentative_hours: HashMap<Uuid, f64> = HashMap::new();
        // Conductores cuyo día ya cuenta como activo en el histórico
        let active_today: HashSet<Uuid> = occupancy
            .iter()
            .filter(|(_, trips)| trips.iter().any(|t| t.status != TripStatus::Cancelled))
            .map(|(driver_id, _)| *driver_id)
            .collect();

        let mut pending: Vec<&TripSnapshot> = input
            .day_trips
            .iter()
            .filter(|t| t.trip_date == input.date)
            .filter(|t| t.driver_id.is_none() && t.status != TripStatus::Cancelled)
            .collect();
        pending.sort_by(|a, b| a.pickup_time.cmp(&b.pickup_time).then_with(|| a.id.cmp(&b.id)));

        let mut assignments = Vec::new();
        let mut unassigned = Vec::new();

        for trip in pending {
            // Sólo los programados se optimizan; un completado sin conductor no ocupa agenda
            if trip.status != TripStatus::Scheduled {
                unassigned.push(UnassignedTrip {
                    trip_id: trip.id,
                    reason: REASON_NOT_SCHEDULED.to_string(),
                });
                continue;
            }

            let Some(pickup_time) = trip.pickup_time else {
                warn!("⚠️ Viaje {} sin hora de recogida, excluido de la optimización", trip.id);
                unassigned.push(UnassignedTrip {
                    trip_id: trip.id,
                    reason: REASON_MISSING_PICKUP.to_string(),
                });
                continue;
            };

            if self
                .options
                .max_assignments
                .is_some_and(|max| assignments.len() >= max)
            {
                unassigned.push(UnassignedTrip {
                    trip_id: trip.id,
                    reason: REASON_MAX_REACHED.to_string(),
                });
                continue;
            }

            let Some(customer) = input.customers.get(&trip.customer_id) else {
                unassigned.push(UnassignedTrip {
                    trip_id: trip.id,
                    reason: REASON_CUSTOMER_NOT_FOUND.to_string(),
                });
                continue;
            };

            let trip_hours = trip.estimated_hours(default_duration);
            let mut candidates: Vec<(usize, &DriverSnapshot, Option<f64>)> = input
                .drivers
                .iter()
                .enumerate()
                .map(|(order, driver)| {
                    let hint = if self.options.consider_proximity {
                        self.proximity.distance_hint(driver, trip)
                    } else {
                        None
                    };
                    (order, driver, hint)
                })
                .collect();
            if self.options.consider_proximity && !self.options.balance_workload {
                candidates.sort_by(|a, b| compare_hints(a.2, b.2).then_with(|| a.0.cmp(&b.0)));
            }

            let mut eligible: Vec<EligibleDriver> = Vec::new();
            let mut rejected = 0usize;

            for (order, driver, hint) in candidates {
                let vehicle_id = trip.vehicle_id.or(driver.usual_vehicle_id);
                let candidate = TripCandidate {
                    trip_id: Some(trip.id),
                    driver_id: Some(driver.id),
                    vehicle_id,
                    customer_id: trip.customer_id,
                    trip_date: trip.trip_date,
                    pickup_time,
                    return_time: trip.return_time,
                    requires_wheelchair: trip.requires_wheelchair,
                    passenger_count: trip.passenger_count,
                };
                let siblings: Vec<TripSnapshot> = occupancy
                    .get(&driver.id)
                    .map(|ts| ts.iter().filter(|t| t.id != trip.id).cloned().collect())
                    .unwrap_or_default();

                let ctx = RuleContext {
                    candidate: &candidate,
                    driver: Some(driver),
                    vehicle: vehicle_id.and_then(|id| input.vehicles.get(&id)),
                    customer,
                    driver_trips: &siblings,
                    policy: self.policy,
                };
                let findings = self.aggregator.evaluate(&ctx);
                if findings.iter().any(|f| f.is_critical()) {
                    rejected += 1;
                    continue;
                }

                let projected_utilization = self.projected_utilization(
                    driver.id,
                    trip_hours,
                    &history,
                    &tentative_hours,
                    &active_today,
                );
                eligible.push(EligibleDriver {
                    order,
                    driver_id: driver.id,
                    vehicle_id,
                    projected_utilization,
                    hint,
                    warning_count: findings.len(),
                });

                if !self.options.balance_workload {
                    break;
                }
            }

            let eligible_count = eligible.len();
            let chosen = if self.options.balance_workload {
                eligible.into_iter().min_by(|a, b| {
                    a.projected_utilization
                        .total_cmp(&b.projected_utilization)
                        .then_with(|| compare_hints(a.hint, b.hint))
                        .then_with(|| a.order.cmp(&b.order))
                })
            } else {
                eligible.into_iter().next()
            };

            let Some(chosen) = chosen else {
                debug!("🚫 Viaje {}: ningún conductor elegible ({} rechazado(s))", trip.id, rejected);
                unassigned.push(UnassignedTrip {
                    trip_id: trip.id,
                    reason: format!(
                        "no eligible driver ({} candidate(s) had critical conflicts)",
                        rejected
                    ),
                });
                continue;
            };

            let mut rationale = if self.options.balance_workload {
                format!(
                    "lowest projected utilization ({:.1}%) among {} eligible driver(s)",
                    chosen.projected_utilization, eligible_count
                )
            } else {
                format!("first eligible driver in list order ({} rejected)", rejected)
            };
            if let Some(distance) = chosen.hint {
                rationale.push_str(&format!("; proximity hint {:.1}", distance));
            }

            let mut tentative = trip.clone();
            tentative.driver_id = Some(chosen.driver_id);
            tentative.vehicle_id = chosen.vehicle_id;
            occupancy.entry(chosen.driver_id).or_default().push(tentative);
            *tentative_hours.entry(chosen.driver_id).or_default() += trip_hours;

            assignments.push(AssignmentProposal {
                trip_id: trip.id,
                driver_id: chosen.driver_id,
                vehicle_id: chosen.vehicle_id,
                trip_version: trip.version,
                score: chosen.projected_utilization,
                rationale,
                warning_count: chosen.warning_count,
            });
        }

        AutoAssignResult {
            date: input.date,
            assignments,
            unassigned,
        }
    }

    /// Utilización del conductor si además hiciera este viaje
    fn projected_utilization(
        &self,
        driver_id: Uuid,
        trip_hours: f64,
        history: &HashMap<Uuid, (f64, usize)>,
        tentative_hours: &HashMap<Uuid, f64>,
        active_today: &HashSet<Uuid>,
    ) -> f64 {
        let (base_hours, base_days) = history.get(&driver_id).copied().unwrap_or((0.0, 0));
        let tentative = tentative_hours.get(&driver_id).copied().unwrap_or(0.0);
        let days = base_days + usize::from(!active_today.contains(&driver_id));
        utilization_percent(base_hours + tentative + trip_hours, days, self.policy)
    }
}

#[derive(Clone)]
pub struct AutoAssignService {
    repository: Arc<dyn RosterRepository>,
    conflicts: ConflictService,
    proximity: Arc<dyn ProximityRanker>,
}

impl AutoAssignService {
    pub fn new(repository: Arc<dyn RosterRepository>, conflicts: ConflictService) -> Self {
        Self::with_proximity(repository, conflicts, Arc::new(NoProximity))
    }

    pub fn with_proximity(
        repository: Arc<dyn RosterRepository>,
        conflicts: ConflictService,
        proximity: Arc<dyn ProximityRanker>,
    ) -> Self {
        Self {
            repository,
            conflicts,
            proximity,
        }
    }

    pub async fn auto_assign(&self, tenant_id: Uuid, date: NaiveDate, options: &AutoAssignOptions) -> AppResult<AutoAssignResult> {
        let policy = self.conflicts.policy();
        info!(
            "🤖 Auto-asignación tenant={} fecha={} balance={} proximidad={} máximo={:?}",
            tenant_id, date, options.balance_workload, options.consider_proximity, options.max_assignments
        );

        let day_trips = self.repository.trips_on_date(tenant_id, date).await?;
        let drivers: Vec<DriverSnapshot> = self
            .repository
            .list_drivers(tenant_id)
            .await?
            .into_iter()
            .filter(|d| d.is_active)
            .collect();

        let window_days = policy.balance_window_days.clamp(1, 366);
        let history_start = date
            .checked_sub_signed(Duration::days(window_days - 1))
            .ok_or_else(|| bad_request_error("date is out of the supported range"))?;
        let history_trips = self.repository.trips_in_range(tenant_id, history_start, date).await?;
        let history = summarize_workload(&history_trips, &HashMap::new(), policy, history_start, date);

        let mut customers = HashMap::new();
        let mut vehicle_ids: Vec<Uuid> = drivers.iter().filter_map(|d| d.usual_vehicle_id).collect();
        for trip in day_trips
            .iter()
            .filter(|t| t.driver_id.is_none() && t.status != TripStatus::Cancelled)
        {
            if !customers.contains_key(&trip.customer_id) {
                if let Some(customer) = self.repository.find_customer(tenant_id, trip.customer_id).await? {
                    customers.insert(trip.customer_id, customer);
                }
            }
            vehicle_ids.extend(trip.vehicle_id);
        }

        vehicle_ids.sort();
        vehicle_ids.dedup();
        let mut vehicles = HashMap::new();
        for vehicle_id in vehicle_ids {
            if let Some(vehicle) = self.repository.find_vehicle(tenant_id, vehicle_id).await? {
                vehicles.insert(vehicle_id, vehicle);
            }
        }

        let input = PlanningInput {
            date,
            day_trips: &day_trips,
            drivers: &drivers,
            customers: &customers,
            vehicles: &vehicles,
            history: &history,
        };
        let planner = AssignmentPlanner::new(policy, self.conflicts.aggregator(), self.proximity.as_ref(), options);
        let result = planner.plan(&input);

        info!(
            "✅ Auto-asignación completada: {} propuesta(s), {} sin asignar",
            result.assignments.len(),
            result.unassigned.len()
        );
        Ok(result)
    }

    /// Paso explícito de guardado: revalida cada propuesta y escribe con
    /// control de versión. Las propuestas se aplican en orden, así cada una
    /// ve las anteriores ya guardadas.
    pub async fn apply_proposals(&self, tenant_id: Uuid, proposals: &[AssignmentProposal]) -> AppResult<ApplyResult> {
        let mut result = ApplyResult::default();

        for proposal in proposals {
            let Some(trip) = self.repository.find_trip(tenant_id, proposal.trip_id).await? else {
                result.rejected.push(RejectedProposal {
                    trip_id: proposal.trip_id,
                    reason: "trip not found".to_string(),
                });
                continue;
            };

            if trip.status != TripStatus::Scheduled {
                result.rejected.push(RejectedProposal {
                    trip_id: trip.id,
                    reason: REASON_NOT_SCHEDULED.to_string(),
                });
                continue;
            }

            let Some(mut candidate) = trip.to_candidate() else {
                result.rejected.push(RejectedProposal {
                    trip_id: trip.id,
                    reason: REASON_MISSING_PICKUP.to_string(),
                });
                continue;
            };
            candidate.driver_id = Some(proposal.driver_id);
            candidate.vehicle_id = proposal.vehicle_id.or(trip.vehicle_id);

            let report = self.conflicts.check_conflicts(tenant_id, &candidate).await?;
            if !report.can_proceed {
                result.rejected.push(RejectedProposal {
                    trip_id: trip.id,
                    reason: report.message,
                });
                continue;
            }

            let written = self
                .repository
                .assign_trip(tenant_id, trip.id, proposal.driver_id, candidate.vehicle_id, proposal.trip_version)
                .await?;
            if written {
                result.applied.push(trip.id);
            } else {
                result.rejected.push(RejectedProposal {
                    trip_id: trip.id,
                    reason: "trip was modified after the proposal was computed".to_string(),
                });
            }
        }

        info!(
            "💾 Propuestas aplicadas tenant={}: {} guardada(s), {} rechazada(s)",
            tenant_id,
            result.applied.len(),
            result.rejected.len()
        );
        Ok(result)
    }
}
