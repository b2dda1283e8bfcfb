mod category_tree_service;

pub use category_tree_service::{build_effective_schema, CategoryTreeService};
