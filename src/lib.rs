//! Catalog attribute schema and constraint-validation core
//!
//! Category hierarchies carry typed attribute definitions that are inherited
//! downward. Listings and their variants are validated against the merged
//! schema, and every accepted variant gets a canonical key.

pub mod core;
pub mod features;
pub mod modules;
pub mod shared;
