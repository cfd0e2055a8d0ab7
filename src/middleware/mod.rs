//! Middleware
//!
//! Capas tower aplicadas al router principal.

pub mod cors;

pub use cors::cors_layer;
