//! Reglas de conflicto
//!
//! Cada regla es una función pura sobre `RuleContext` que devuelve cero o más
//! hallazgos. El agregador las ejecuta en el orden fijo de `default_rules`;
//! una regla nueva se añade a esa lista sin tocar el agregador.

pub mod customer_preference;
pub mod driver_fitness;
pub mod scheduling_overlap;
pub mod vehicle_fitness;
pub mod vehicle_pairing;
pub mod work_hours;

pub use customer_preference::CustomerPreferenceRule;
pub use driver_fitness::DriverFitnessRule;
pub use scheduling_overlap::SchedulingOverlapRule;
pub use vehicle_fitness::VehicleFitnessRule;
pub use vehicle_pairing::VehiclePairingRule;
pub use work_hours::WorkHoursRule;

use crate::config::RosteringPolicy;
use crate::models::{ConflictFinding, CustomerSnapshot, DriverSnapshot, TripCandidate, TripSnapshot, VehicleSnapshot};

/// Entrada de una regla: el candidato y las instantáneas que se pudieron resolver.
///
/// `driver`/`vehicle` son `None` cuando el candidato no los referencia o el id
/// no existe; las reglas que los necesitan se omiten en silencio.
pub struct RuleContext<'a> {
    pub candidate: &'a TripCandidate,
    pub driver: Option<&'a DriverSnapshot>,
    pub vehicle: Option<&'a VehicleSnapshot>,
    pub customer: &'a CustomerSnapshot,
    /// Viajes del conductor en la misma fecha y tenant, sin el propio candidato
    pub driver_trips: &'a [TripSnapshot],
    pub policy: &'a RosteringPolicy,
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<ConflictFinding>;
}

/// Orden documentado: vehículo, conductor, solapamiento, horas, cliente, emparejamiento
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(VehicleFitnessRule),
        Box::new(DriverFitnessRule),
        Box::new(SchedulingOverlapRule),
        Box::new(WorkHoursRule),
        Box::new(CustomerPreferenceRule),
        Box::new(VehiclePairingRule),
    ]
}
