pub mod attributes;
pub mod categories;
pub mod listings;
pub mod lookups;
pub mod validation;
pub mod variants;
