//! Oráculo de disponibilidad
//!
//! Responde si un conductor o un cliente está libre en una fecha. Cualquier
//! viaje no cancelado ese día lo marca como no disponible: es una ocupación
//! por día completo, más gruesa que la regla de solapamiento del agregador.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::models::{AvailabilityResult, EntityType, TripSnapshot, TripStatus};
use crate::repositories::RosterRepository;
use crate::utils::errors::{not_found_error, AppResult};

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Arc<dyn RosterRepository>,
}

impl AvailabilityService {
    pub fn new(repository: Arc<dyn RosterRepository>) -> Self {
        Self { repository }
    }

    pub async fn check_availability(
        &self,
        tenant_id: Uuid,
        entity_type: EntityType,
        entity_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<AvailabilityResult> {
        let result = match entity_type {
            EntityType::Driver => self.driver_availability(tenant_id, entity_id, date).await?,
            EntityType::Customer => self.customer_availability(tenant_id, entity_id, date).await?,
        };

        info!(
            "📅 Disponibilidad {:?} {} en {}: {}",
            entity_type, entity_id, date, result.available
        );
        Ok(result)
    }

    async fn driver_availability(&self, tenant_id: Uuid, driver_id: Uuid, date: NaiveDate) -> AppResult<AvailabilityResult> {
        let driver = self
            .repository
            .find_driver(tenant_id, driver_id)
            .await?
            .ok_or_else(|| not_found_error("Driver", &driver_id.to_string()))?;

        if !driver.is_active {
            return Ok(AvailabilityResult::unavailable(
                format!("Driver {} is inactive", driver.name),
                "inactive",
                None,
            ));
        }

        let trips = self.repository.trips_for_driver(tenant_id, driver_id, date).await?;
        Ok(match first_booking(&trips) {
            Some(trip) => AvailabilityResult::unavailable(
                format!(
                    "Driver {} is already booked for a trip with {}{} on {}",
                    driver.name,
                    trip.label(),
                    at_time(trip),
                    date
                ),
                "trip",
                Some(trip.id),
            ),
            None => AvailabilityResult::available(format!("Driver {} has no trips on {}", driver.name, date)),
        })
    }

    async fn customer_availability(&self, tenant_id: Uuid, customer_id: Uuid, date: NaiveDate) -> AppResult<AvailabilityResult> {
        let customer = self
            .repository
            .find_customer(tenant_id, customer_id)
            .await?
            .ok_or_else(|| not_found_error("Customer", &customer_id.to_string()))?;

        let trips = self.repository.trips_for_customer(tenant_id, customer_id, date).await?;
        Ok(match first_booking(&trips) {
            Some(trip) => AvailabilityResult::unavailable(
                format!("{} already has a trip booked{} on {}", customer.name, at_time(trip), date),
                "trip",
                Some(trip.id),
            ),
            None => AvailabilityResult::available(format!("{} has no trips on {}", customer.name, date)),
        })
    }
}

/// Primer viaje no cancelado del día (los completados también ocupan)
fn first_booking(trips: &[TripSnapshot]) -> Option<&TripSnapshot> {
    trips.iter().find(|t| t.status != TripStatus::Cancelled)
}

fn at_time(trip: &TripSnapshot) -> String {
    trip.pickup_time
        .map(|t| format!(" at {}", t.format("%H:%M")))
        .unwrap_or_default()
}
