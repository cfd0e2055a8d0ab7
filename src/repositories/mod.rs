//! Repositorios
//!
//! Acceso de lectura a conductores, vehículos, clientes y viajes, siempre
//! acotado por tenant. El motor sólo escribe a través de `assign_trip`,
//! usado por el paso explícito de aplicar propuestas.

pub mod memory_roster_repository;
pub mod pg_roster_repository;

pub use memory_roster_repository::MemoryRosterRepository;
pub use pg_roster_repository::PgRosterRepository;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{CustomerSnapshot, DriverSnapshot, TripSnapshot, VehicleSnapshot};
use crate::utils::errors::AppResult;

/// Repositorio de entidades consumido por el motor de asignación.
///
/// Las listas de viajes se devuelven ordenadas por hora de recogida e id.
/// Los errores de acceso se propagan tal cual; el motor no reintenta.
#[async_trait]
pub trait RosterRepository: Send + Sync {
    async fn find_driver(&self, tenant_id: Uuid, driver_id: Uuid) -> AppResult<Option<DriverSnapshot>>;

    async fn find_vehicle(&self, tenant_id: Uuid, vehicle_id: Uuid) -> AppResult<Option<VehicleSnapshot>>;

    async fn find_customer(&self, tenant_id: Uuid, customer_id: Uuid) -> AppResult<Option<CustomerSnapshot>>;

    /// Todos los conductores del tenant, en el orden estable de listado
    async fn list_drivers(&self, tenant_id: Uuid) -> AppResult<Vec<DriverSnapshot>>;

    async fn find_trip(&self, tenant_id: Uuid, trip_id: Uuid) -> AppResult<Option<TripSnapshot>>;

    async fn trips_for_driver(&self, tenant_id: Uuid, driver_id: Uuid, date: NaiveDate) -> AppResult<Vec<TripSnapshot>>;

    async fn trips_for_customer(&self, tenant_id: Uuid, customer_id: Uuid, date: NaiveDate) -> AppResult<Vec<TripSnapshot>>;

    async fn trips_on_date(&self, tenant_id: Uuid, date: NaiveDate) -> AppResult<Vec<TripSnapshot>>;

    /// Rango inclusivo `[start, end]`
    async fn trips_in_range(&self, tenant_id: Uuid, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<TripSnapshot>>;

    /// Asignar conductor (y vehículo) si la versión guardada sigue siendo `expected_version`.
    /// Devuelve `false` si el viaje cambió desde que se calculó la propuesta.
    async fn assign_trip(
        &self,
        tenant_id: Uuid,
        trip_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Option<Uuid>,
        expected_version: i32,
    ) -> AppResult<bool>;
}

/// Orden canónico de viajes: recogida (sin hora al final) y luego id
pub(crate) fn sort_trips(trips: &mut [TripSnapshot]) {
    trips.sort_by(|a, b| {
        a.trip_date
            .cmp(&b.trip_date)
            .then_with(|| match (a.pickup_time, b.pickup_time) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.id.cmp(&b.id))
    });
}
