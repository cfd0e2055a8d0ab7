//! Servicio de detección de conflictos
//!
//! Orquesta las reglas para un candidato (o para todos los viajes asignados
//! de un rango de fechas), concatena los hallazgos y decide si la asignación
//! se puede guardar. Es un camino de sólo lectura.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::RosteringPolicy;
use crate::models::{
    ConflictFinding, ConflictReport, CustomerSnapshot, DriverSnapshot, TripCandidate, TripConflictReport,
    TripSnapshot, VehicleSnapshot,
};
use crate::repositories::RosterRepository;
use crate::services::rules::{default_rules, Rule, RuleContext};
use crate::utils::errors::{bad_request_error, not_found_error, AppResult};

/// Lista ordenada de reglas; determinista para una misma entrada
pub struct ConflictAggregator {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for ConflictAggregator {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl ConflictAggregator {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding> {
        let mut findings = Vec::new();
        for rule in &self.rules {
            let rule_findings = rule.evaluate(ctx);
            for finding in rule_findings.iter().filter(|f| f.is_critical()) {
                debug!("🚫 {} -> {}: {}", rule.name(), finding.code, finding.message);
            }
            findings.extend(rule_findings);
        }
        findings
    }

    pub fn report(&self, ctx: &RuleContext<'_>) -> ConflictReport {
        ConflictReport::from_findings(self.evaluate(ctx))
    }
}

/// Instantáneas resueltas para un candidato
struct CandidateSnapshots {
    driver: Option<DriverSnapshot>,
    vehicle: Option<VehicleSnapshot>,
    customer: CustomerSnapshot,
    driver_trips: Vec<TripSnapshot>,
}

#[derive(Clone)]
pub struct ConflictService {
    repository: Arc<dyn RosterRepository>,
    policy: Arc<RosteringPolicy>,
    aggregator: Arc<ConflictAggregator>,
}

impl ConflictService {
    pub fn new(repository: Arc<dyn RosterRepository>, policy: Arc<RosteringPolicy>) -> Self {
        Self::with_aggregator(repository, policy, Arc::new(ConflictAggregator::default()))
    }

    pub fn with_aggregator(
        repository: Arc<dyn RosterRepository>,
        policy: Arc<RosteringPolicy>,
        aggregator: Arc<ConflictAggregator>,
    ) -> Self {
        Self {
            repository,
            policy,
            aggregator,
        }
    }

    pub fn aggregator(&self) -> &ConflictAggregator {
        &self.aggregator
    }

    pub fn policy(&self) -> &RosteringPolicy {
        &self.policy
    }

    /// Validar una combinación conductor/vehículo/cliente antes de guardarla
    pub async fn check_conflicts(&self, tenant_id: Uuid, candidate: &TripCandidate) -> AppResult<ConflictReport> {
        debug!(
            "🔍 Verificando conflictos tenant={} fecha={} conductor={:?} vehículo={:?}",
            tenant_id, candidate.trip_date, candidate.driver_id, candidate.vehicle_id
        );

        let snapshots = self.load_snapshots(tenant_id, candidate).await?;
        let ctx = RuleContext {
            candidate,
            driver: snapshots.driver.as_ref(),
            vehicle: snapshots.vehicle.as_ref(),
            customer: &snapshots.customer,
            driver_trips: &snapshots.driver_trips,
            policy: &self.policy,
        };
        let report = self.aggregator.report(&ctx);

        info!(
            "✅ Conflictos verificados: {} crítico(s), {} aviso(s), can_proceed={}",
            report.critical_count(),
            report.warning_count(),
            report.can_proceed
        );
        Ok(report)
    }

    /// Revalidar todos los viajes asignados y programados de `[start, end]`.
    /// Sólo devuelve los viajes con hallazgos.
    pub async fn scan_conflicts(&self, tenant_id: Uuid, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<TripConflictReport>> {
        if end < start {
            return Err(bad_request_error("end date must not be before start date"));
        }
        info!("🔎 Escaneando conflictos tenant={} {}..{}", tenant_id, start, end);

        let trips = self.repository.trips_in_range(tenant_id, start, end).await?;

        let mut by_driver_day: HashMap<(Uuid, NaiveDate), Vec<TripSnapshot>> = HashMap::new();
        for trip in &trips {
            if let Some(driver_id) = trip.driver_id {
                by_driver_day
                    .entry((driver_id, trip.trip_date))
                    .or_default()
                    .push(trip.clone());
            }
        }

        let mut drivers: HashMap<Uuid, Option<DriverSnapshot>> = HashMap::new();
        let mut vehicles: HashMap<Uuid, Option<VehicleSnapshot>> = HashMap::new();
        let mut customers: HashMap<Uuid, Option<CustomerSnapshot>> = HashMap::new();
        let mut reports = Vec::new();

        for trip in trips.iter().filter(|t| t.status.occupies_schedule()) {
            let (Some(driver_id), Some(candidate)) = (trip.driver_id, trip.to_candidate()) else {
                continue;
            };

            if !drivers.contains_key(&driver_id) {
                let driver = self.repository.find_driver(tenant_id, driver_id).await?;
                drivers.insert(driver_id, driver);
            }
            if let Some(vehicle_id) = trip.vehicle_id {
                if !vehicles.contains_key(&vehicle_id) {
                    let vehicle = self.repository.find_vehicle(tenant_id, vehicle_id).await?;
                    vehicles.insert(vehicle_id, vehicle);
                }
            }
            if !customers.contains_key(&trip.customer_id) {
                let customer = self.repository.find_customer(tenant_id, trip.customer_id).await?;
                customers.insert(trip.customer_id, customer);
            }

            let Some(customer) = customers.get(&trip.customer_id).and_then(|c| c.as_ref()) else {
                warn!("⚠️ Viaje {} referencia un cliente inexistente, se omite", trip.id);
                continue;
            };
            let driver = drivers.get(&driver_id).and_then(|d| d.as_ref());
            let siblings: Vec<TripSnapshot> = match driver {
                Some(_) => by_driver_day
                    .get(&(driver_id, trip.trip_date))
                    .map(|ts| ts.iter().filter(|t| t.id != trip.id).cloned().collect())
                    .unwrap_or_default(),
                None => Vec::new(),
            };

            let ctx = RuleContext {
                candidate: &candidate,
                driver,
                vehicle: trip.vehicle_id.and_then(|id| vehicles.get(&id)).and_then(|v| v.as_ref()),
                customer,
                driver_trips: &siblings,
                policy: &self.policy,
            };
            let report = self.aggregator.report(&ctx);
            if !report.findings.is_empty() {
                reports.push(TripConflictReport {
                    trip_id: trip.id,
                    trip_date: trip.trip_date,
                    report,
                });
            }
        }

        info!("✅ Escaneo completado: {} viaje(s) con hallazgos", reports.len());
        Ok(reports)
    }

    async fn load_snapshots(&self, tenant_id: Uuid, candidate: &TripCandidate) -> AppResult<CandidateSnapshots> {
        if let Some(trip_id) = candidate.trip_id {
            if self.repository.find_trip(tenant_id, trip_id).await?.is_none() {
                return Err(not_found_error("Trip", &trip_id.to_string()));
            }
        }

        let customer = self
            .repository
            .find_customer(tenant_id, candidate.customer_id)
            .await?
            .ok_or_else(|| not_found_error("Customer", &candidate.customer_id.to_string()))?;

        let driver = match candidate.driver_id {
            Some(driver_id) => self.repository.find_driver(tenant_id, driver_id).await?,
            None => None,
        };

        let vehicle = match candidate.vehicle_id {
            Some(vehicle_id) => self.repository.find_vehicle(tenant_id, vehicle_id).await?,
            None => None,
        };

        let driver_trips = match &driver {
            Some(driver) => self
                .repository
                .trips_for_driver(tenant_id, driver.id, candidate.trip_date)
                .await?
                .into_iter()
                .filter(|t| Some(t.id) != candidate.trip_id)
                .collect(),
            None => Vec::new(),
        };

        Ok(CandidateSnapshots {
            driver,
            vehicle,
            customer,
            driver_trips,
        })
    }
}
