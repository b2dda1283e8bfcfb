mod schema_service;

pub use schema_service::{slug_path_of, SchemaService};
