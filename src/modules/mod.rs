//! Modules layer - Infrastructure behind the catalog core
//!
//! Store traits the services depend on, and the snapshot-backed implementation.

pub mod storage;
