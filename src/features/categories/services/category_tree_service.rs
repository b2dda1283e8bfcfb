use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

use crate::core::config::CatalogConfig;
use crate::core::error::{AppError, Result, SchemaResolutionError};
use crate::features::categories::dtos::CategoryTreeDto;
use crate::features::categories::models::{AllowListIndex, CategoryNode, EffectiveSchema};
use crate::features::lookups::models::{LookupConstraint, LookupOption};
use crate::modules::storage::{self, CategoryStore, LookupStore};

/// Service resolving the effective attribute schema of a category
pub struct CategoryTreeService {
    store: Arc<dyn CategoryStore>,
    config: CatalogConfig,
}

impl CategoryTreeService {
    pub fn new(store: Arc<dyn CategoryStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    /// Resolve own + inherited definitions and the allow-list index of a category
    pub async fn resolve_effective_schema(&self, category_id: Uuid) -> Result<EffectiveSchema> {
        let chain = self.fetch_chain(category_id).await?;
        let schema = build_effective_schema(category_id, &chain, self.config.max_hierarchy_depth)?;

        tracing::debug!(
            "Resolved schema for '{}' (version {}): {} definition(s)",
            schema.slug_path,
            schema.category_version,
            schema.definitions().len()
        );

        Ok(schema)
    }

    /// Like `resolve_effective_schema`, but only for categories sellers may list under
    pub async fn resolve_listable_schema(&self, category_id: Uuid) -> Result<EffectiveSchema> {
        let chain = self.fetch_chain(category_id).await?;
        let schema = build_effective_schema(category_id, &chain, self.config.max_hierarchy_depth)?;

        // build_effective_schema guarantees a non-empty chain ending at category_id
        if let Some(leaf) = chain.last() {
            if !leaf.is_listable() {
                return Err(AppError::NotListable(format!(
                    "Category '{}' is {} and {}",
                    leaf.slug_path,
                    leaf.state,
                    if leaf.selectable {
                        "selectable"
                    } else {
                        "a container"
                    }
                )));
            }
        }

        Ok(schema)
    }

    /// Options a seller may choose for a lookup type inside a category.
    ///
    /// Open types offer every option; otherwise the nearest ancestor declaring
    /// an allow-list for the type decides. A category with no entries for the
    /// type declares no list, so the walk continues upward, the same rule
    /// `AllowListIndex` applies (entries cannot express an empty list).
    pub async fn selectable_lookup_options(
        &self,
        category_id: Uuid,
        lookup_type_id: Uuid,
        constraint_override: Option<LookupConstraint>,
        lookups: &dyn LookupStore,
    ) -> Result<Vec<LookupOption>> {
        let lookup_type = self
            .with_timeout(lookups.lookup_type(lookup_type_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lookup type {} not found", lookup_type_id)))?;

        let mut options = match constraint_override.unwrap_or(lookup_type.constraint) {
            LookupConstraint::Open => {
                self.with_timeout(lookups.options_for(lookup_type_id))
                    .await?
            }
            LookupConstraint::RequireAllowList => {
                let chain = self.fetch_chain(category_id).await?;
                let mut nearest = Vec::new();
                for node in chain.iter().rev() {
                    let list = self
                        .with_timeout(lookups.allow_list_for(node.id, lookup_type_id))
                        .await?;
                    if !list.is_empty() {
                        nearest = list;
                        break;
                    }
                }
                nearest
            }
        };

        options.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.code.cmp(&b.code)));
        Ok(options)
    }

    /// Whole category forest for admin display
    pub async fn category_tree(&self) -> Result<Vec<CategoryTreeDto>> {
        let categories = self.with_timeout(self.store.list()).await?;
        Ok(CategoryTreeDto::build_tree(&categories))
    }

    async fn fetch_chain(&self, category_id: Uuid) -> Result<Vec<CategoryNode>> {
        self.with_timeout(self.store.resolve(category_id)).await
    }

    async fn with_timeout<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        storage::with_timeout(self.config.store_timeout, fut).await
    }
}

/// Merge a root-first ancestor chain into the effective schema of its last node.
///
/// Definitions are inherited downward; allow-lists are indexed in a single
/// root-to-leaf walk where the nearest declaration per lookup type wins.
pub fn build_effective_schema(
    category_id: Uuid,
    chain: &[CategoryNode],
    max_depth: usize,
) -> std::result::Result<EffectiveSchema, SchemaResolutionError> {
    let leaf = match chain.last() {
        Some(leaf) if leaf.id == category_id => leaf,
        _ => return Err(SchemaResolutionError::CategoryNotFound(category_id)),
    };

    if chain.len() > max_depth {
        return Err(SchemaResolutionError::CyclicHierarchy(category_id));
    }

    let mut seen = HashSet::with_capacity(chain.len());
    for (depth, node) in chain.iter().enumerate() {
        if !seen.insert(node.id) {
            return Err(SchemaResolutionError::CyclicHierarchy(node.id));
        }
        let expected_parent = if depth == 0 {
            None
        } else {
            Some(chain[depth - 1].id)
        };
        if node.parent_id != expected_parent {
            return match (depth, node.parent_id) {
                (0, Some(parent_id)) => Err(SchemaResolutionError::CategoryNotFound(parent_id)),
                _ => Err(SchemaResolutionError::CyclicHierarchy(node.id)),
            };
        }
    }

    let definitions = chain
        .iter()
        .enumerate()
        .flat_map(|(depth, node)| node.attributes.iter().map(move |d| (depth, d.clone())))
        .collect();

    Ok(EffectiveSchema::new(
        leaf,
        definitions,
        AllowListIndex::from_chain(chain),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::attributes::models::ValidationPass;
    use crate::features::lookups::models::LookupAllowEntry;
    use crate::modules::storage::InMemoryCatalogStore;
    use crate::shared::test_helpers::{
        allow, child_category, enum_attr, int_attr, lookup_option, lookup_type, root_category,
        string_attr, DefinitionExt,
    };

    fn three_level_chain() -> Vec<CategoryNode> {
        let mut root = root_category("electronics");
        let mut mid = child_category(&root, "phones");
        let mut leaf = child_category(&mid, "smartphones");

        root.attributes.push(int_attr(&root, "warranty_months", 1, None, None));
        root.attributes.push(string_attr(&root, "model_name", 0, None).as_required());
        mid.attributes.push(enum_attr(&mid, "color", 1, &["red", "blue"]).as_variant());
        leaf.attributes.push(int_attr(&leaf, "storage_gb", 0, Some(1), Some(2048)).as_variant());

        vec![root, mid, leaf]
    }

    #[test]
    fn test_definitions_ordered_by_position_then_depth() {
        let chain = three_level_chain();
        let leaf_id = chain[2].id;

        let schema = build_effective_schema(leaf_id, &chain, 64).unwrap();
        let keys: Vec<&str> = schema.definitions().iter().map(|d| d.key.as_str()).collect();

        assert_eq!(
            keys,
            vec!["model_name", "storage_gb", "warranty_months", "color"]
        );
        assert_eq!(schema.category_id, leaf_id);
        assert_eq!(schema.top_level(ValidationPass::Variant).count(), 2);
    }

    #[test]
    fn test_resolution_is_stable() {
        let chain = three_level_chain();
        let leaf_id = chain[2].id;

        let first = build_effective_schema(leaf_id, &chain, 64).unwrap();
        let second = build_effective_schema(leaf_id, &chain, 64).unwrap();

        assert_eq!(first.definitions(), second.definitions());
        assert_eq!(first.allow_list(), second.allow_list());
    }

    #[test]
    fn test_nearest_allow_list_wins() {
        let brand = lookup_type("brand", LookupConstraint::RequireAllowList);
        let apple = lookup_option(&brand, "apple", 0);
        let samsung = lookup_option(&brand, "samsung", 1);

        let mut chain = three_level_chain();
        let root_id = chain[0].id;
        let mid_id = chain[1].id;
        chain[0].allow_entries.push(allow(root_id, &apple));
        chain[0].allow_entries.push(allow(root_id, &samsung));
        chain[1].allow_entries.push(allow(mid_id, &apple));

        let leaf_id = chain[2].id;
        let schema = build_effective_schema(leaf_id, &chain, 64).unwrap();
        let list = schema.allow_list().get(brand.id).unwrap();

        assert_eq!(list.source_category_id, mid_id);
        assert!(schema.allow_list().allows(brand.id, apple.id));
        assert!(!schema.allow_list().allows(brand.id, samsung.id));
    }

    #[test]
    fn test_entries_for_other_categories_are_ignored() {
        let brand = lookup_type("brand", LookupConstraint::RequireAllowList);
        let apple = lookup_option(&brand, "apple", 0);

        let mut chain = three_level_chain();
        chain[1].allow_entries.push(LookupAllowEntry {
            category_id: Uuid::new_v4(),
            lookup_type_id: brand.id,
            lookup_option_id: apple.id,
        });

        let leaf_id = chain[2].id;
        let schema = build_effective_schema(leaf_id, &chain, 64).unwrap();
        assert!(schema.allow_list().is_empty());
    }

    #[test]
    fn test_empty_chain_is_not_found() {
        let id = Uuid::new_v4();
        assert_eq!(
            build_effective_schema(id, &[], 64).unwrap_err(),
            SchemaResolutionError::CategoryNotFound(id)
        );
    }

    #[test]
    fn test_repeated_node_is_cyclic() {
        let chain = three_level_chain();
        let mut looped = chain.clone();
        let mut again = chain[1].clone();
        again.parent_id = Some(chain[2].id);
        looped.push(again.clone());

        let result = build_effective_schema(again.id, &looped, 64);
        assert_eq!(
            result.unwrap_err(),
            SchemaResolutionError::CyclicHierarchy(again.id)
        );
    }

    #[test]
    fn test_depth_limit_reports_cycle() {
        let chain = three_level_chain();
        let leaf_id = chain[2].id;
        assert_eq!(
            build_effective_schema(leaf_id, &chain, 2).unwrap_err(),
            SchemaResolutionError::CyclicHierarchy(leaf_id)
        );
    }

    #[tokio::test]
    async fn test_service_resolves_through_store() {
        let chain = three_level_chain();
        let leaf_id = chain[2].id;
        let store = Arc::new(InMemoryCatalogStore::from_parts(chain, vec![], vec![], vec![]).unwrap());
        let service = CategoryTreeService::new(store, CatalogConfig::default());

        let schema = service.resolve_listable_schema(leaf_id).await.unwrap();
        assert_eq!(schema.slug_path, "electronics/phones/smartphones");

        let missing = service.resolve_effective_schema(Uuid::new_v4()).await;
        assert!(matches!(
            missing,
            Err(AppError::SchemaResolution(
                SchemaResolutionError::CategoryNotFound(_)
            ))
        ));
    }

    #[tokio::test]
    async fn test_container_is_not_listable() {
        let chain = three_level_chain();
        let root_id = chain[0].id;
        let store = Arc::new(InMemoryCatalogStore::from_parts(chain, vec![], vec![], vec![]).unwrap());
        let service = CategoryTreeService::new(store, CatalogConfig::default());

        let result = service.resolve_listable_schema(root_id).await;
        assert!(matches!(result, Err(AppError::NotListable(_))));
        assert!(service.resolve_effective_schema(root_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_category_tree_projection() {
        let chain = three_level_chain();
        let store = Arc::new(InMemoryCatalogStore::from_parts(chain, vec![], vec![], vec![]).unwrap());
        let service = CategoryTreeService::new(store, CatalogConfig::default());

        let tree = service.category_tree().await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children[0].children[0].slug, "smartphones");
        assert!(tree[0].children[0].children[0].listable);
    }

    #[tokio::test]
    async fn test_selectable_lookup_options() {
        let open = lookup_type("colorway", LookupConstraint::Open);
        let strict = lookup_type("brand", LookupConstraint::RequireAllowList);
        let navy = lookup_option(&open, "navy", 0);
        let apple = lookup_option(&strict, "apple", 0);
        let samsung = lookup_option(&strict, "samsung", 1);

        let mut chain = three_level_chain();
        let root_id = chain[0].id;
        let mid_id = chain[1].id;
        let leaf_id = chain[2].id;
        chain[0].allow_entries.push(allow(root_id, &apple));
        chain[0].allow_entries.push(allow(root_id, &samsung));
        chain[1].allow_entries.push(allow(mid_id, &samsung));

        let store = Arc::new(
            InMemoryCatalogStore::from_parts(
                chain,
                vec![open.clone(), strict.clone()],
                vec![navy, apple, samsung],
                vec![],
            )
            .unwrap(),
        );
        let service = CategoryTreeService::new(store.clone(), CatalogConfig::default());

        let strict_options = service
            .selectable_lookup_options(leaf_id, strict.id, None, store.as_ref())
            .await
            .unwrap();
        let codes: Vec<&str> = strict_options.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(codes, vec!["samsung"]);

        // The leaf declares nothing for brand; both views fall through to mid
        let schema = service.resolve_effective_schema(leaf_id).await.unwrap();
        let nearest = schema.allow_list().get(strict.id).unwrap();
        assert_eq!(nearest.source_category_id, mid_id);
        assert_eq!(
            nearest.options,
            strict_options
                .iter()
                .map(|o| o.id)
                .collect::<std::collections::HashSet<_>>()
        );

        let open_options = service
            .selectable_lookup_options(leaf_id, open.id, None, store.as_ref())
            .await
            .unwrap();
        assert_eq!(open_options.len(), 1);

        let overridden = service
            .selectable_lookup_options(leaf_id, open.id, Some(LookupConstraint::RequireAllowList), store.as_ref())
            .await
            .unwrap();
        assert!(overridden.is_empty());
    }
}
