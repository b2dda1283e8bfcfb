//! Validation of seller-supplied attribute assignments against an
//! effective category schema.

pub mod models;
pub mod services;

pub use services::AssignmentValidator;
