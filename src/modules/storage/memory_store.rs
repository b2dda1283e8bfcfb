use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::error::{AppError, Result, SchemaResolutionError};
use crate::features::attributes::models::AttributeDefinition;
use crate::features::attributes::SchemaService;
use crate::features::categories::models::CategoryNode;
use crate::features::listings::models::ListingCommit;
use crate::features::lookups::models::{LookupLink, LookupOption, LookupType};
use crate::features::lookups::LookupCatalog;
use crate::features::variants::models::VariantKey;
use crate::modules::storage::snapshot::CatalogSnapshot;
use crate::modules::storage::traits::{CategoryStore, ListingStore, LookupStore};

#[derive(Debug, Default)]
struct CatalogState {
    categories: HashMap<Uuid, CategoryNode>,
    lookups: LookupCatalog,
    listings: HashMap<Uuid, ListingCommit>,
}

/// Process-local catalog and listing store.
///
/// Every snapshot is checked with `SchemaService` before it is accepted, and
/// commits are guarded by the category version.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    state: RwLock<CatalogState>,
}

impl InMemoryCatalogStore {
    pub fn from_parts(
        categories: Vec<CategoryNode>,
        lookup_types: Vec<LookupType>,
        lookup_options: Vec<LookupOption>,
        lookup_links: Vec<LookupLink>,
    ) -> Result<Self> {
        let lookups = LookupCatalog::new(lookup_types, lookup_options, lookup_links)?;
        SchemaService::new(&lookups).validate_tree(&categories)?;

        tracing::info!(
            "Loaded catalog: {} categories, {} lookup types",
            categories.len(),
            lookups.types().count()
        );

        Ok(Self {
            state: RwLock::new(CatalogState {
                categories: categories.into_iter().map(|c| (c.id, c)).collect(),
                lookups,
                listings: HashMap::new(),
            }),
        })
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self> {
        Self::from_parts(
            snapshot.categories,
            snapshot.lookup_types,
            snapshot.lookup_options,
            snapshot.lookup_links,
        )
    }

    /// Declare a new attribute on a category, returning the bumped version
    pub async fn add_definition(
        &self,
        category_id: Uuid,
        definition: AttributeDefinition,
    ) -> Result<i64> {
        let mut state = self.state.write().await;

        let chain = chain_of(&state.categories, category_id)?;
        let Some((node, ancestors)) = chain.split_last() else {
            return Err(SchemaResolutionError::CategoryNotFound(category_id).into());
        };

        let service = SchemaService::new(&state.lookups);
        let mut updated = node.clone();
        service.add_definition(&mut updated, ancestors, definition)?;

        // Descendants must not already use the new key
        let mut candidate: Vec<CategoryNode> = state
            .categories
            .values()
            .filter(|c| c.id != category_id)
            .cloned()
            .collect();
        candidate.push(updated.clone());
        service.validate_tree(&candidate)?;

        let version = updated.version;
        state.categories.insert(category_id, updated);
        Ok(version)
    }

    /// Accepted attributes and variants stored for a listing
    pub async fn listing(&self, listing_id: Uuid) -> Option<ListingCommit> {
        self.state.read().await.listings.get(&listing_id).cloned()
    }
}

/// Root-first ancestor chain of a category
fn chain_of(
    categories: &HashMap<Uuid, CategoryNode>,
    category_id: Uuid,
) -> std::result::Result<Vec<CategoryNode>, SchemaResolutionError> {
    let mut chain = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = Some(category_id);

    while let Some(id) = cursor {
        let node = categories
            .get(&id)
            .ok_or(SchemaResolutionError::CategoryNotFound(id))?;
        if !visited.insert(id) {
            return Err(SchemaResolutionError::CyclicHierarchy(category_id));
        }
        chain.push(node.clone());
        cursor = node.parent_id;
    }

    chain.reverse();
    Ok(chain)
}

#[async_trait]
impl CategoryStore for InMemoryCatalogStore {
    async fn resolve(&self, category_id: Uuid) -> Result<Vec<CategoryNode>> {
        let state = self.state.read().await;
        Ok(chain_of(&state.categories, category_id)?)
    }

    async fn list(&self) -> Result<Vec<CategoryNode>> {
        let state = self.state.read().await;
        Ok(state.categories.values().cloned().collect())
    }
}

#[async_trait]
impl LookupStore for InMemoryCatalogStore {
    async fn lookup_type(&self, lookup_type_id: Uuid) -> Result<Option<LookupType>> {
        let state = self.state.read().await;
        Ok(state.lookups.lookup_type(lookup_type_id).cloned())
    }

    async fn options_for(&self, lookup_type_id: Uuid) -> Result<Vec<LookupOption>> {
        let state = self.state.read().await;
        Ok(state
            .lookups
            .options_of(lookup_type_id)
            .into_iter()
            .cloned()
            .collect())
    }

    async fn links_for(&self, lookup_type_id: Uuid) -> Result<Vec<LookupLink>> {
        let state = self.state.read().await;
        Ok(state.lookups.links_into(lookup_type_id))
    }

    async fn allow_list_for(
        &self,
        category_id: Uuid,
        lookup_type_id: Uuid,
    ) -> Result<Vec<LookupOption>> {
        let state = self.state.read().await;
        let node = state
            .categories
            .get(&category_id)
            .ok_or(SchemaResolutionError::CategoryNotFound(category_id))?;

        Ok(node
            .allow_entries
            .iter()
            .filter(|e| e.category_id == category_id && e.lookup_type_id == lookup_type_id)
            .filter_map(|e| state.lookups.option(e.lookup_option_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ListingStore for InMemoryCatalogStore {
    async fn variant_keys(&self, listing_id: Uuid) -> Result<Vec<VariantKey>> {
        let state = self.state.read().await;
        Ok(state
            .listings
            .get(&listing_id)
            .map(|l| l.variants.iter().map(|v| v.key.clone()).collect())
            .unwrap_or_default())
    }

    async fn commit(&self, commit: ListingCommit) -> Result<()> {
        let mut state = self.state.write().await;

        let current_version = state
            .categories
            .get(&commit.category_id)
            .map(|c| c.version)
            .ok_or(SchemaResolutionError::CategoryNotFound(commit.category_id))?;
        if current_version != commit.category_version {
            return Err(AppError::StaleSchema(format!(
                "Category {} is at version {}, submission was validated against {}",
                commit.category_id, current_version, commit.category_version
            )));
        }

        let (mut keys, mut skus): (HashSet<VariantKey>, HashSet<String>) =
            match state.listings.get(&commit.listing_id) {
                Some(existing) if existing.category_id != commit.category_id => {
                    return Err(AppError::Conflict(format!(
                        "Listing {} belongs to another category",
                        commit.listing_id
                    )))
                }
                Some(existing) => (
                    existing.variants.iter().map(|v| v.key.clone()).collect(),
                    existing.variants.iter().map(|v| v.sku.clone()).collect(),
                ),
                None => (HashSet::new(), HashSet::new()),
            };

        for variant in &commit.variants {
            if !keys.insert(variant.key.clone()) {
                return Err(AppError::Conflict(format!(
                    "Listing {} already has a variant with key '{}'",
                    commit.listing_id, variant.key
                )));
            }
            if !skus.insert(variant.sku.clone()) {
                return Err(AppError::Conflict(format!(
                    "Listing {} already has a variant with SKU '{}'",
                    commit.listing_id, variant.sku
                )));
            }
        }

        tracing::info!(
            "Committed listing {} ({} attribute(s), {} new variant(s)) at category version {}",
            commit.listing_id,
            commit.attributes.len(),
            commit.variants.len(),
            commit.category_version
        );

        match state.listings.get_mut(&commit.listing_id) {
            Some(existing) => {
                existing.category_version = commit.category_version;
                existing.attributes = commit.attributes;
                existing.variants.extend(commit.variants);
            }
            None => {
                state.listings.insert(commit.listing_id, commit);
            }
        }

        Ok(())
    }
}
