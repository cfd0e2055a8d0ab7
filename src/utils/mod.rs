//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores.

pub mod errors;

pub use errors::{AppError, AppResult};
