use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::features::attributes::models::AttributeAssignment;
use crate::features::listings::models::{AcceptedVariant, ListingCommit};
use crate::features::validation::models::ValidatedAssignment;
use crate::features::variants::models::SelectionSnapshot;

/// Request DTO for one variant of a listing
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VariantAttributesDto {
    #[validate(
        length(min = 1, max = 64, message = "SKU must be 1-64 characters"),
        regex(
            path = "*crate::shared::validation::SKU_REGEX",
            message = "SKU must start with a letter or digit and contain only letters, digits, dots, underscores and hyphens"
        )
    )]
    pub sku: String,

    #[serde(default)]
    pub attributes: Vec<AttributeAssignment>,
}

/// Request DTO for submitting the attributes of a listing and its variants
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListingAttributesDto {
    pub listing_id: Uuid,
    pub category_id: Uuid,

    #[serde(default)]
    pub attributes: Vec<AttributeAssignment>,

    #[validate(nested)]
    #[serde(default)]
    pub variants: Vec<VariantAttributesDto>,
}

/// Response DTO for an accepted variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedVariantDto {
    pub sku: String,
    pub variant_key: String,
    pub digest: String,
    pub snapshot: SelectionSnapshot,
}

impl From<&AcceptedVariant> for AcceptedVariantDto {
    fn from(v: &AcceptedVariant) -> Self {
        Self {
            sku: v.sku.clone(),
            variant_key: v.key.to_string(),
            digest: v.digest.clone(),
            snapshot: v.snapshot.clone(),
        }
    }
}

/// Response DTO for an accepted submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcceptedListingDto {
    pub listing_id: Uuid,
    pub category_id: Uuid,
    pub category_version: i64,
    pub attributes: Vec<ValidatedAssignment>,
    pub variants: Vec<AcceptedVariantDto>,
}

impl From<ListingCommit> for AcceptedListingDto {
    fn from(c: ListingCommit) -> Self {
        Self {
            listing_id: c.listing_id,
            category_id: c.category_id,
            category_version: c.category_version,
            variants: c.variants.iter().map(AcceptedVariantDto::from).collect(),
            attributes: c.attributes,
        }
    }
}
