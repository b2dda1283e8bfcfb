use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::validation::models::ValidatedAssignment;
use crate::features::variants::models::{SelectionSnapshot, VariantKey};

/// A variant that passed validation and received its key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedVariant {
    pub sku: String,
    pub key: VariantKey,
    /// SHA-256 of `key`, hex encoded
    pub digest: String,
    pub snapshot: SelectionSnapshot,
    pub attributes: Vec<ValidatedAssignment>,
}

/// Everything the listing store persists for one accepted submission.
///
/// `category_version` is the optimistic token: the store refuses the commit
/// when the category has moved on since validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCommit {
    pub listing_id: Uuid,
    pub category_id: Uuid,
    pub category_version: i64,
    pub attributes: Vec<ValidatedAssignment>,
    pub variants: Vec<AcceptedVariant>,
}
