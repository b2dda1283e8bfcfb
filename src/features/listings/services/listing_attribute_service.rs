use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::sync::Arc;

use validator::Validate;

use crate::core::config::CatalogConfig;
use crate::core::error::{AppError, Result};
use crate::features::attributes::models::ValidationPass;
use crate::features::categories::models::EffectiveSchema;
use crate::features::categories::CategoryTreeService;
use crate::features::listings::dtos::{AcceptedListingDto, ListingAttributesDto};
use crate::features::listings::models::{AcceptedVariant, ListingCommit};
use crate::features::lookups::LookupCatalog;
use crate::features::validation::AssignmentValidator;
use crate::features::variants::VariantKeyBuilder;
use crate::modules::storage::{self, CategoryStore, ListingStore, LookupStore};

/// Service accepting listing and variant attribute submissions
pub struct ListingAttributeService {
    tree: CategoryTreeService,
    lookups: Arc<dyn LookupStore>,
    listings: Arc<dyn ListingStore>,
    config: CatalogConfig,
}

impl ListingAttributeService {
    pub fn new(
        categories: Arc<dyn CategoryStore>,
        lookups: Arc<dyn LookupStore>,
        listings: Arc<dyn ListingStore>,
        config: CatalogConfig,
    ) -> Self {
        Self {
            tree: CategoryTreeService::new(categories, config.clone()),
            lookups,
            listings,
            config,
        }
    }

    /// Validate and commit the attributes of a listing and its variants.
    ///
    /// Every assignment problem of the submission is returned in a single
    /// `AppError::Validation`. A stale category version is re-resolved and
    /// re-validated up to the configured retry count before it is surfaced.
    pub async fn submit(&self, dto: ListingAttributesDto) -> Result<AcceptedListingDto> {
        dto.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let mut skus = HashSet::with_capacity(dto.variants.len());
        for variant in &dto.variants {
            if !skus.insert(variant.sku.as_str()) {
                return Err(AppError::BadRequest(format!(
                    "SKU '{}' appears more than once in the submission",
                    variant.sku
                )));
            }
        }

        let mut retries = 0;
        loop {
            let commit = self.prepare(&dto).await?;
            match self.with_timeout(self.listings.commit(commit.clone())).await {
                Ok(()) => {
                    tracing::info!(
                        "Accepted listing {} with {} variant(s) under category version {}",
                        commit.listing_id,
                        commit.variants.len(),
                        commit.category_version
                    );
                    return Ok(commit.into());
                }
                Err(e) if e.is_stale() && retries < self.config.stale_schema_retries => {
                    retries += 1;
                    tracing::warn!(
                        "Schema changed while committing listing {}, re-validating ({}/{}): {}",
                        dto.listing_id,
                        retries,
                        self.config.stale_schema_retries,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Resolve, validate and key one submission against the current schema
    async fn prepare(&self, dto: &ListingAttributesDto) -> Result<ListingCommit> {
        let schema = self.tree.resolve_listable_schema(dto.category_id).await?;
        let catalog = self.load_catalog(&schema).await?;
        let existing = self
            .with_timeout(self.listings.variant_keys(dto.listing_id))
            .await?;

        let validator = AssignmentValidator::new(&catalog, self.config.decimal_scale);
        let builder = VariantKeyBuilder::new(self.config.decimal_scale);
        let mut errors = Vec::new();

        let listing = match validator.validate(&schema, ValidationPass::Listing, &dto.attributes) {
            Ok(listing) => Some(listing),
            Err(e) => {
                errors.extend(e);
                None
            }
        };

        let mut variants: Vec<(usize, AcceptedVariant)> = Vec::with_capacity(dto.variants.len());
        for (index, variant) in dto.variants.iter().enumerate() {
            match validator.validate_with_context(
                &schema,
                ValidationPass::Variant,
                &variant.attributes,
                listing.as_ref(),
            ) {
                Ok(validated) => {
                    let (key, snapshot) =
                        builder.build_key(&validated.assignments, schema.category_version);
                    variants.push((
                        index,
                        AcceptedVariant {
                            sku: variant.sku.clone(),
                            digest: key.digest(),
                            key,
                            snapshot,
                            attributes: validated.assignments,
                        },
                    ));
                }
                Err(e) => errors.extend(e.into_iter().map(|e| e.for_variant(index))),
            }
        }

        let keys: Vec<_> = variants.iter().map(|(_, v)| v.key.clone()).collect();
        for duplicate in builder.check_unique(&keys, &existing) {
            // check_unique indexes into `keys`; map back to the submission
            let index = duplicate
                .variant_index
                .and_then(|i| variants.get(i))
                .map(|(index, _)| *index);
            errors.push(match index {
                Some(index) => duplicate.for_variant(index),
                None => duplicate,
            });
        }

        if !errors.is_empty() {
            tracing::debug!(
                "Listing {} rejected with {} error(s)",
                dto.listing_id,
                errors.len()
            );
            return Err(AppError::Validation(errors));
        }

        Ok(ListingCommit {
            listing_id: dto.listing_id,
            category_id: schema.category_id,
            category_version: schema.category_version,
            attributes: listing.map(|l| l.assignments).unwrap_or_default(),
            variants: variants.into_iter().map(|(_, v)| v).collect(),
        })
    }

    /// Lookup snapshot covering the types the schema binds and their parent types
    async fn load_catalog(&self, schema: &EffectiveSchema) -> Result<LookupCatalog> {
        let bound: HashSet<_> = schema.lookup_type_ids().into_iter().collect();
        let mut queue: VecDeque<_> = schema.lookup_type_ids().into();
        let mut loaded = HashSet::new();
        let (mut types, mut options, mut links) = (Vec::new(), Vec::new(), Vec::new());

        while let Some(lookup_type_id) = queue.pop_front() {
            if !loaded.insert(lookup_type_id) {
                continue;
            }

            let lookup_type = self
                .with_timeout(self.lookups.lookup_type(lookup_type_id))
                .await?
                .ok_or_else(|| {
                    AppError::InvalidSchema(format!(
                        "Lookup type {} used by '{}' does not exist",
                        lookup_type_id, schema.slug_path
                    ))
                })?;
            types.push(lookup_type);
            options.extend(
                self.with_timeout(self.lookups.options_for(lookup_type_id))
                    .await?,
            );

            if bound.contains(&lookup_type_id) {
                for link in self
                    .with_timeout(self.lookups.links_for(lookup_type_id))
                    .await?
                {
                    queue.push_back(link.parent_type_id);
                    links.push(link);
                }
            }
        }

        LookupCatalog::new(types, options, links)
    }

    async fn with_timeout<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        storage::with_timeout(self.config.store_timeout, fut).await
    }
}
