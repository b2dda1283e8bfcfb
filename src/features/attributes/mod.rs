//! Attribute definitions, the kind registry, and schema authoring checks.

pub mod dtos;
pub mod models;
pub mod registry;
pub mod services;

pub use services::SchemaService;
