//! Lookup dictionaries: global, type-keyed reusable values and the link
//! graph scoping child values under a chosen parent value.

pub mod models;
pub mod services;

pub use services::LookupCatalog;
