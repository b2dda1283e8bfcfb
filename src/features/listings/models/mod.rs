mod listing;

pub use listing::{AcceptedVariant, ListingCommit};
