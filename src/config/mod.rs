//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y la política de asignación de conductores.

pub mod database;
pub mod environment;
pub mod rostering;

pub use environment::EnvironmentConfig;
pub use rostering::RosteringPolicy;
