mod lookup_catalog;

pub use lookup_catalog::LookupCatalog;
