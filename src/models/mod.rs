//! Modelos del sistema
//!
//! Instantáneas de solo lectura de las entidades que consume el motor
//! (conductores, vehículos, clientes, viajes) y los resultados que produce.

pub mod assignment;
pub mod availability;
pub mod conflict;
pub mod customer;
pub mod driver;
pub mod trip;
pub mod vehicle;
pub mod workload;

pub use assignment::*;
pub use availability::*;
pub use conflict::*;
pub use customer::CustomerSnapshot;
pub use driver::{Certification, DriverSnapshot};
pub use trip::*;
pub use vehicle::VehicleSnapshot;
pub use workload::*;
