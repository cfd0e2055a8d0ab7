//! DTOs de la API
//!
//! Formas de request/response de la capa HTTP.

pub mod api_response;
pub mod rostering_dto;

pub use api_response::ApiResponse;
