//! Category hierarchy and effective attribute schema resolution.
//!
//! Categories form a forest. Attribute definitions and lookup allow-lists
//! declared on a node apply to its whole subtree; a category's effective
//! schema is the merge of its ancestor chain, root first.

pub mod dtos;
pub mod models;
pub mod services;

pub use services::CategoryTreeService;
