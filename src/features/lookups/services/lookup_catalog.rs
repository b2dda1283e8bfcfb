use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::lookups::models::{LookupConstraint, LookupLink, LookupOption, LookupType};
use crate::shared::validation::{CODE_REGEX, KEY_REGEX};

/// In-memory snapshot of lookup types, their options and the link graph.
///
/// Built once per validation run from whatever the lookup store returns and
/// then only read. Options and links are kept in flat id-keyed arenas.
#[derive(Debug, Clone, Default)]
pub struct LookupCatalog {
    types: HashMap<Uuid, LookupType>,
    type_keys: HashMap<String, Uuid>,
    options: HashMap<Uuid, LookupOption>,
    links: Vec<LookupLink>,
    /// child type -> parent types with at least one link into it
    parents_by_child: HashMap<Uuid, Vec<Uuid>>,
    /// (parent option, child option)
    link_pairs: HashSet<(Uuid, Uuid)>,
}

impl LookupCatalog {
    /// Build a catalog, rejecting snapshots that break lookup invariants
    pub fn new(
        types: Vec<LookupType>,
        options: Vec<LookupOption>,
        links: Vec<LookupLink>,
    ) -> Result<Self> {
        let mut catalog = LookupCatalog::default();

        for lookup_type in types {
            if !KEY_REGEX.is_match(&lookup_type.key) {
                return Err(AppError::InvalidSchema(format!(
                    "Lookup type key '{}' is not a valid key",
                    lookup_type.key
                )));
            }
            if catalog.type_keys.contains_key(&lookup_type.key) {
                return Err(AppError::InvalidSchema(format!(
                    "Lookup type key '{}' is not unique",
                    lookup_type.key
                )));
            }
            catalog
                .type_keys
                .insert(lookup_type.key.clone(), lookup_type.id);
            catalog.types.insert(lookup_type.id, lookup_type);
        }

        let mut codes: HashSet<(Uuid, String)> = HashSet::new();
        for option in options {
            let Some(owner) = catalog.types.get(&option.lookup_type_id) else {
                return Err(AppError::InvalidSchema(format!(
                    "Lookup option '{}' references unknown lookup type {}",
                    option.code, option.lookup_type_id
                )));
            };
            if !CODE_REGEX.is_match(&option.code) {
                return Err(AppError::InvalidSchema(format!(
                    "Lookup option code '{}' of '{}' is not a valid code",
                    option.code, owner.key
                )));
            }
            if !codes.insert((option.lookup_type_id, option.code.clone())) {
                return Err(AppError::InvalidSchema(format!(
                    "Lookup option code '{}' is not unique within '{}'",
                    option.code, owner.key
                )));
            }
            catalog.options.insert(option.id, option);
        }

        for link in links {
            catalog.check_link(&link)?;
            if catalog
                .link_pairs
                .insert((link.parent_option_id, link.child_option_id))
            {
                let parents = catalog
                    .parents_by_child
                    .entry(link.child_type_id)
                    .or_default();
                if !parents.contains(&link.parent_type_id) {
                    parents.push(link.parent_type_id);
                    parents.sort();
                }
                catalog.links.push(link);
            }
        }

        Ok(catalog)
    }

    fn check_link(&self, link: &LookupLink) -> Result<()> {
        if link.parent_type_id == link.child_type_id {
            return Err(AppError::InvalidSchema(format!(
                "Lookup link cannot connect type {} to itself",
                link.parent_type_id
            )));
        }

        for (type_id, option_id, side) in [
            (link.parent_type_id, link.parent_option_id, "parent"),
            (link.child_type_id, link.child_option_id, "child"),
        ] {
            match self.options.get(&option_id) {
                Some(option) if option.lookup_type_id == type_id => {}
                Some(_) => {
                    return Err(AppError::InvalidSchema(format!(
                        "Lookup link {} option {} does not belong to type {}",
                        side, option_id, type_id
                    )))
                }
                None => {
                    return Err(AppError::InvalidSchema(format!(
                        "Lookup link references unknown {} option {}",
                        side, option_id
                    )))
                }
            }
        }

        Ok(())
    }

    pub fn lookup_type(&self, id: Uuid) -> Option<&LookupType> {
        self.types.get(&id)
    }

    pub fn lookup_type_by_key(&self, key: &str) -> Option<&LookupType> {
        self.type_keys.get(key).and_then(|id| self.types.get(id))
    }

    pub fn option(&self, id: Uuid) -> Option<&LookupOption> {
        self.options.get(&id)
    }

    /// Options of a type ordered by position, then code
    pub fn options_of(&self, lookup_type_id: Uuid) -> Vec<&LookupOption> {
        let mut options: Vec<&LookupOption> = self
            .options
            .values()
            .filter(|o| o.lookup_type_id == lookup_type_id)
            .collect();
        options.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.code.cmp(&b.code)));
        options
    }

    /// Types that scope `child_type_id` through at least one link
    pub fn parent_types_of(&self, child_type_id: Uuid) -> &[Uuid] {
        self.parents_by_child
            .get(&child_type_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_parent(&self, child_type_id: Uuid) -> bool {
        !self.parent_types_of(child_type_id).is_empty()
    }

    pub fn is_linked(&self, parent_option_id: Uuid, child_option_id: Uuid) -> bool {
        self.link_pairs.contains(&(parent_option_id, child_option_id))
    }

    /// Options of `child_type_id` that are valid once `parent_option_id` is chosen
    pub fn child_options(&self, parent_option_id: Uuid, child_type_id: Uuid) -> Vec<&LookupOption> {
        let mut options: Vec<&LookupOption> = self
            .links
            .iter()
            .filter(|l| l.parent_option_id == parent_option_id && l.child_type_id == child_type_id)
            .filter_map(|l| self.options.get(&l.child_option_id))
            .collect();
        options.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.code.cmp(&b.code)));
        options
    }

    /// Links in which `child_type_id` is the child
    pub fn links_into(&self, child_type_id: Uuid) -> Vec<LookupLink> {
        self.links
            .iter()
            .filter(|l| l.child_type_id == child_type_id)
            .copied()
            .collect()
    }

    /// Definition-level override wins over the type's own mode
    pub fn effective_constraint(
        &self,
        lookup_type_id: Uuid,
        override_constraint: Option<LookupConstraint>,
    ) -> Option<LookupConstraint> {
        let lookup_type = self.types.get(&lookup_type_id)?;
        Some(override_constraint.unwrap_or(lookup_type.constraint))
    }

    pub fn types(&self) -> impl Iterator<Item = &LookupType> {
        self.types.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{lookup_link, lookup_option, lookup_type};

    fn brand_and_model() -> (LookupType, LookupType, Vec<LookupOption>, LookupLink) {
        let brand = lookup_type("brand", LookupConstraint::Open);
        let model = lookup_type("device_model", LookupConstraint::Open);
        let apple = lookup_option(&brand, "apple", 0);
        let samsung = lookup_option(&brand, "samsung", 1);
        let iphone = lookup_option(&model, "iphone_14", 0);
        let galaxy = lookup_option(&model, "galaxy_s23", 1);
        let link = lookup_link(&apple, &iphone);
        (brand, model, vec![apple, samsung, iphone, galaxy], link)
    }

    #[test]
    fn test_link_graph_indexes_parents() {
        let (brand, model, options, link) = brand_and_model();
        let catalog =
            LookupCatalog::new(vec![brand.clone(), model.clone()], options, vec![link]).unwrap();

        assert_eq!(catalog.parent_types_of(model.id), &[brand.id]);
        assert!(!catalog.has_parent(brand.id));
        assert!(catalog.is_linked(link.parent_option_id, link.child_option_id));

        let children = catalog.child_options(link.parent_option_id, model.id);
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].code, "iphone_14");
    }

    #[test]
    fn test_options_are_ordered_by_position() {
        let (brand, model, options, link) = brand_and_model();
        let catalog = LookupCatalog::new(vec![brand.clone(), model], options, vec![link]).unwrap();

        let codes: Vec<&str> = catalog
            .options_of(brand.id)
            .iter()
            .map(|o| o.code.as_str())
            .collect();
        assert_eq!(codes, vec!["apple", "samsung"]);
        assert_eq!(catalog.lookup_type_by_key("brand").unwrap().id, brand.id);
    }

    #[test]
    fn test_duplicate_type_key_rejected() {
        let first = lookup_type("brand", LookupConstraint::Open);
        let second = lookup_type("brand", LookupConstraint::RequireAllowList);

        let result = LookupCatalog::new(vec![first, second], vec![], vec![]);
        assert!(matches!(result, Err(AppError::InvalidSchema(_))));
    }

    #[test]
    fn test_duplicate_option_code_rejected() {
        let brand = lookup_type("brand", LookupConstraint::Open);
        let a = lookup_option(&brand, "apple", 0);
        let b = lookup_option(&brand, "apple", 1);

        let result = LookupCatalog::new(vec![brand], vec![a, b], vec![]);
        assert!(matches!(result, Err(AppError::InvalidSchema(_))));
    }

    #[test]
    fn test_link_with_mismatched_option_type_rejected() {
        let (brand, model, options, mut link) = brand_and_model();
        // Point the child side at a brand option
        link.child_option_id = link.parent_option_id;

        let result = LookupCatalog::new(vec![brand, model], options, vec![link]);
        assert!(matches!(result, Err(AppError::InvalidSchema(_))));
    }

    #[test]
    fn test_effective_constraint_prefers_override() {
        let brand = lookup_type("brand", LookupConstraint::Open);
        let catalog = LookupCatalog::new(vec![brand.clone()], vec![], vec![]).unwrap();

        assert_eq!(
            catalog.effective_constraint(brand.id, None),
            Some(LookupConstraint::Open)
        );
        assert_eq!(
            catalog.effective_constraint(brand.id, Some(LookupConstraint::RequireAllowList)),
            Some(LookupConstraint::RequireAllowList)
        );
        assert_eq!(catalog.effective_constraint(Uuid::new_v4(), None), None);
    }
}
