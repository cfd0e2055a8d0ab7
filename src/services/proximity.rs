//! Cercanía conductor/recogida
//!
//! Gancho opcional para ordenar candidatos por cercanía. Las distancias las
//! calcula un servicio de mapas externo; aquí sólo se consumen como pistas.
//! Nunca es una restricción: sin pista el orden no cambia.

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{DriverSnapshot, TripSnapshot};

pub trait ProximityRanker: Send + Sync {
    /// Distancia relativa (menor es más cerca) o `None` si se desconoce
    fn distance_hint(&self, driver: &DriverSnapshot, trip: &TripSnapshot) -> Option<f64>;
}

/// Sin servicio de mapas configurado
pub struct NoProximity;

impl ProximityRanker for NoProximity {
    fn distance_hint(&self, _driver: &DriverSnapshot, _trip: &TripSnapshot) -> Option<f64> {
        None
    }
}

/// Distancias precalculadas por (conductor, viaje)
#[derive(Debug, Default, Clone)]
pub struct DistanceTable {
    distances: HashMap<(Uuid, Uuid), f64>,
}

impl DistanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, driver_id: Uuid, trip_id: Uuid, distance: f64) {
        self.distances.insert((driver_id, trip_id), distance);
    }
}

impl ProximityRanker for DistanceTable {
    fn distance_hint(&self, driver: &DriverSnapshot, trip: &TripSnapshot) -> Option<f64> {
        self.distances.get(&(driver.id, trip.id)).copied()
    }
}

/// Orden estable: con pista de menor a mayor, sin pista al final
pub fn compare_hints(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
