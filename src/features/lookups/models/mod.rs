mod lookup_link;
mod lookup_type;

pub use lookup_link::{LookupAllowEntry, LookupLink};
pub use lookup_type::{LookupConstraint, LookupOption, LookupType};
