use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares that `child_option_id` is valid only when `parent_option_id` is
/// the value chosen for the parent lookup in the same assignment set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupLink {
    pub parent_type_id: Uuid,
    pub parent_option_id: Uuid,
    pub child_type_id: Uuid,
    pub child_option_id: Uuid,
}

/// Explicit allow-list entry narrowing a lookup type inside a category subtree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupAllowEntry {
    pub category_id: Uuid,
    pub lookup_type_id: Uuid,
    pub lookup_option_id: Uuid,
}
