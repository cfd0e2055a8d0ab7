//! Repositorio en memoria
//!
//! Implementación de `RosterRepository` sobre mapas protegidos por `RwLock`.
//! La usan los tests y el servidor cuando no hay `DATABASE_URL`.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{sort_trips, RosterRepository};
use crate::models::{CustomerSnapshot, DriverSnapshot, TripSnapshot, VehicleSnapshot};
use crate::utils::errors::AppResult;

#[derive(Default)]
struct TenantData {
    /// Orden de inserción = orden de listado
    drivers: Vec<DriverSnapshot>,
    vehicles: HashMap<Uuid, VehicleSnapshot>,
    customers: HashMap<Uuid, CustomerSnapshot>,
    trips: Vec<TripSnapshot>,
}

#[derive(Default)]
pub struct MemoryRosterRepository {
    tenants: RwLock<HashMap<Uuid, TenantData>>,
    offline: AtomicBool,
}

impl MemoryRosterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_driver(&self, tenant_id: Uuid, driver: DriverSnapshot) {
        let mut tenants = self.tenants.write().await;
        let data = tenants.entry(tenant_id).or_default();
        data.drivers.retain(|d| d.id != driver.id);
        data.drivers.push(driver);
    }

    pub async fn insert_vehicle(&self, tenant_id: Uuid, vehicle: VehicleSnapshot) {
        let mut tenants = self.tenants.write().await;
        tenants.entry(tenant_id).or_default().vehicles.insert(vehicle.id, vehicle);
    }

    pub async fn insert_customer(&self, tenant_id: Uuid, customer: CustomerSnapshot) {
        let mut tenants = self.tenants.write().await;
        tenants.entry(tenant_id).or_default().customers.insert(customer.id, customer);
    }

    /// El tenant se toma del propio viaje
    pub async fn insert_trip(&self, trip: TripSnapshot) {
        let mut tenants = self.tenants.write().await;
        let data = tenants.entry(trip.tenant_id).or_default();
        data.trips.retain(|t| t.id != trip.id);
        data.trips.push(trip);
    }

    /// Simular una caída del almacenamiento: toda operación falla
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(())
    }

    async fn select_trips<F>(&self, tenant_id: Uuid, predicate: F) -> AppResult<Vec<TripSnapshot>>
    where
        F: Fn(&TripSnapshot) -> bool + Send,
    {
        self.ensure_online()?;
        let tenants = self.tenants.read().await;
        let mut trips: Vec<TripSnapshot> = tenants
            .get(&tenant_id)
            .map(|data| data.trips.iter().filter(|t| predicate(t)).cloned().collect())
            .unwrap_or_default();
        sort_trips(&mut trips);
        Ok(trips)
    }
}

#[async_trait]
impl RosterRepository for MemoryRosterRepository {
    async fn find_driver(&self, tenant_id: Uuid, driver_id: Uuid) -> AppResult<Option<DriverSnapshot>> {
        self.ensure_online()?;
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .and_then(|data| data.drivers.iter().find(|d| d.id == driver_id).cloned()))
    }

    async fn find_vehicle(&self, tenant_id: Uuid, vehicle_id: Uuid) -> AppResult<Option<VehicleSnapshot>> {
        self.ensure_online()?;
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .and_then(|data| data.vehicles.get(&vehicle_id).cloned()))
    }

    async fn find_customer(&self, tenant_id: Uuid, customer_id: Uuid) -> AppResult<Option<CustomerSnapshot>> {
        self.ensure_online()?;
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .and_then(|data| data.customers.get(&customer_id).cloned()))
    }

    async fn list_drivers(&self, tenant_id: Uuid) -> AppResult<Vec<DriverSnapshot>> {
        self.ensure_online()?;
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .map(|data| data.drivers.clone())
            .unwrap_or_default())
    }

    async fn find_trip(&self, tenant_id: Uuid, trip_id: Uuid) -> AppResult<Option<TripSnapshot>> {
        self.ensure_online()?;
        let tenants = self.tenants.read().await;
        Ok(tenants
            .get(&tenant_id)
            .and_then(|data| data.trips.iter().find(|t| t.id == trip_id).cloned()))
    }

    async fn trips_for_driver(&self, tenant_id: Uuid, driver_id: Uuid, date: NaiveDate) -> AppResult<Vec<TripSnapshot>> {
        self.select_trips(tenant_id, move |t| t.driver_id == Some(driver_id) && t.trip_date == date)
            .await
    }

    async fn trips_for_customer(&self, tenant_id: Uuid, customer_id: Uuid, date: NaiveDate) -> AppResult<Vec<TripSnapshot>> {
        self.select_trips(tenant_id, move |t| t.customer_id == customer_id && t.trip_date == date)
            .await
    }

    async fn trips_on_date(&self, tenant_id: Uuid, date: NaiveDate) -> AppResult<Vec<TripSnapshot>> {
        self.select_trips(tenant_id, move |t| t.trip_date == date).await
    }

    async fn trips_in_range(&self, tenant_id: Uuid, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<TripSnapshot>> {
        self.select_trips(tenant_id, move |t| t.trip_date >= start && t.trip_date <= end)
            .await
    }

    async fn assign_trip(
        &self,
        tenant_id: Uuid,
        trip_id: Uuid,
        driver_id: Uuid,
        vehicle_id: Option<Uuid>,
        expected_version: i32,
    ) -> AppResult<bool> {
        self.ensure_online()?;
        let mut tenants = self.tenants.write().await;
        let Some(trip) = tenants
            .get_mut(&tenant_id)
            .and_then(|data| data.trips.iter_mut().find(|t| t.id == trip_id))
        else {
            return Ok(false);
        };

        if trip.version != expected_version || !trip.status.occupies_schedule() {
            return Ok(false);
        }

        trip.driver_id = Some(driver_id);
        if vehicle_id.is_some() {
            trip.vehicle_id = vehicle_id;
        }
        trip.version += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TripStatus;
    use crate::utils::errors::AppError;
    use chrono::NaiveTime;

    fn trip(tenant_id: Uuid, date: NaiveDate, hour: u32) -> TripSnapshot {
        TripSnapshot {
            id: Uuid::new_v4(),
            tenant_id,
            trip_date: date,
            pickup_time: NaiveTime::from_hms_opt(hour, 0, 0),
            return_time: None,
            driver_id: None,
            vehicle_id: None,
            customer_id: Uuid::new_v4(),
            customer_name: None,
            requires_wheelchair: false,
            passenger_count: None,
            status: TripStatus::Scheduled,
            version: 0,
        }
    }

    #[tokio::test]
    async fn test_trips_are_tenant_scoped_and_sorted() {
        let repo = MemoryRosterRepository::new();
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();

        repo.insert_trip(trip(tenant, date, 14)).await;
        repo.insert_trip(trip(tenant, date, 9)).await;
        repo.insert_trip(trip(other, date, 10)).await;

        let trips = repo.trips_on_date(tenant, date).await.unwrap();
        assert_eq!(trips.len(), 2);
        assert!(trips[0].pickup_time < trips[1].pickup_time);
    }

    #[tokio::test]
    async fn test_assign_trip_checks_version() {
        let repo = MemoryRosterRepository::new();
        let tenant = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let t = trip(tenant, date, 9);
        let trip_id = t.id;
        repo.insert_trip(t).await;

        let driver = Uuid::new_v4();
        assert!(repo.assign_trip(tenant, trip_id, driver, None, 0).await.unwrap());
        assert!(!repo.assign_trip(tenant, trip_id, driver, None, 0).await.unwrap());

        let stored = repo.find_trip(tenant, trip_id).await.unwrap().unwrap();
        assert_eq!(stored.driver_id, Some(driver));
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_offline_propagates_database_error() {
        let repo = MemoryRosterRepository::new();
        repo.set_offline(true);
        let result = repo.list_drivers(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }
}
