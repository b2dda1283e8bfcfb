//! Variant identity: canonical keys and point-in-time selection snapshots.

pub mod models;
pub mod services;

pub use services::VariantKeyBuilder;
