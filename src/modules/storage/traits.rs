use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::categories::models::CategoryNode;
use crate::features::listings::models::ListingCommit;
use crate::features::lookups::models::{LookupLink, LookupOption, LookupType};
use crate::features::variants::models::VariantKey;

/// Read access to the category hierarchy
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Ancestor chain of a category, root first and the category itself last.
    ///
    /// Fails with `SchemaResolutionError::CategoryNotFound` when the id or one
    /// of its ancestors does not resolve.
    async fn resolve(&self, category_id: Uuid) -> Result<Vec<CategoryNode>>;

    /// Every category, in no particular order
    async fn list(&self) -> Result<Vec<CategoryNode>>;
}

/// Read access to lookup dictionaries
#[async_trait]
pub trait LookupStore: Send + Sync {
    async fn lookup_type(&self, lookup_type_id: Uuid) -> Result<Option<LookupType>>;

    async fn options_for(&self, lookup_type_id: Uuid) -> Result<Vec<LookupOption>>;

    /// Links in which the given type is the child
    async fn links_for(&self, lookup_type_id: Uuid) -> Result<Vec<LookupLink>>;

    /// Allow-list declared directly on one category (ancestors are not consulted)
    async fn allow_list_for(
        &self,
        category_id: Uuid,
        lookup_type_id: Uuid,
    ) -> Result<Vec<LookupOption>>;
}

/// Persistence of accepted listing attributes
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Variant keys already stored for a listing
    async fn variant_keys(&self, listing_id: Uuid) -> Result<Vec<VariantKey>>;

    /// Persist an accepted submission.
    ///
    /// Must fail with `AppError::StaleSchema` when the category version no
    /// longer matches `commit.category_version`, and with `AppError::Conflict`
    /// when a `(listing_id, variant_key)` pair already exists.
    async fn commit(&self, commit: ListingCommit) -> Result<()>;
}
