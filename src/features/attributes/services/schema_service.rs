use std::collections::{HashMap, HashSet};

use regex::Regex;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::attributes::models::{AttributeDefinition, AttributeKind, NumericBounds};
use crate::features::attributes::registry;
use crate::features::categories::models::CategoryNode;
use crate::features::lookups::LookupCatalog;
use crate::shared::constants::SLUG_PATH_SEPARATOR;
use crate::shared::validation::{CODE_REGEX, KEY_REGEX, SLUG_REGEX};

/// Integrity checks applied when schema is authored or loaded
pub struct SchemaService<'a> {
    lookups: &'a LookupCatalog,
}

impl<'a> SchemaService<'a> {
    pub fn new(lookups: &'a LookupCatalog) -> Self {
        Self { lookups }
    }

    /// Validate a whole category forest together with its definitions and allow entries
    pub fn validate_tree(&self, nodes: &[CategoryNode]) -> Result<()> {
        let mut by_id: HashMap<Uuid, &CategoryNode> = HashMap::with_capacity(nodes.len());
        for node in nodes {
            if by_id.insert(node.id, node).is_some() {
                return Err(invalid(format!("Category id {} is not unique", node.id)));
            }
        }

        let mut slug_paths = HashSet::with_capacity(nodes.len());
        let mut sibling_slugs = HashSet::with_capacity(nodes.len());

        for node in nodes {
            if !SLUG_REGEX.is_match(&node.slug) {
                return Err(invalid(format!("Category slug '{}' is not valid", node.slug)));
            }
            if !sibling_slugs.insert((node.parent_id, node.slug.as_str())) {
                return Err(invalid(format!(
                    "Category slug '{}' is not unique among its siblings",
                    node.slug
                )));
            }

            let ancestors = ancestors_of(node, &by_id)?;
            if let Some(parent) = ancestors.last() {
                if !parent.accepts_children() {
                    return Err(invalid(format!(
                        "Category '{}' is selectable and does not permit children",
                        parent.slug_path
                    )));
                }
            }

            let expected_path = slug_path_of(&ancestors, &node.slug);
            if node.slug_path != expected_path {
                return Err(invalid(format!(
                    "Category slug path '{}' does not match its ancestry ('{}')",
                    node.slug_path, expected_path
                )));
            }
            if !slug_paths.insert(node.slug_path.as_str()) {
                return Err(invalid(format!(
                    "Category slug path '{}' is not unique",
                    node.slug_path
                )));
            }

            self.validate_allow_entries(node)?;

            let inherited: HashSet<&str> = ancestors
                .iter()
                .flat_map(|a| a.attributes.iter().map(|d| d.key.as_str()))
                .collect();
            self.validate_definitions(node, &inherited)?;

            let chain: Vec<&CategoryNode> =
                ancestors.iter().copied().chain(std::iter::once(node)).collect();
            self.check_link_passes(&chain)?;
        }

        Ok(())
    }

    /// Append a definition to a category and bump its version.
    ///
    /// `ancestors` is the root-first chain above `node`. The node is left
    /// untouched when the resulting schema would be invalid.
    pub fn add_definition(
        &self,
        node: &mut CategoryNode,
        ancestors: &[CategoryNode],
        definition: AttributeDefinition,
    ) -> Result<()> {
        let mut candidate = node.clone();
        candidate.attributes.push(definition);

        let inherited: HashSet<&str> = ancestors
            .iter()
            .flat_map(|a| a.attributes.iter().map(|d| d.key.as_str()))
            .collect();
        self.validate_definitions(&candidate, &inherited)?;

        let chain: Vec<&CategoryNode> = ancestors
            .iter()
            .chain(std::iter::once(&candidate))
            .collect();
        self.check_link_passes(&chain)?;

        candidate.version += 1;
        tracing::info!(
            "Added attribute to '{}', schema version {} -> {}",
            node.slug_path,
            node.version,
            candidate.version
        );
        *node = candidate;
        Ok(())
    }

    /// Validate the definitions owned by one category
    pub fn validate_definitions(&self, node: &CategoryNode, inherited: &HashSet<&str>) -> Result<()> {
        let by_id: HashMap<Uuid, &AttributeDefinition> =
            node.attributes.iter().map(|d| (d.id, d)).collect();
        if by_id.len() != node.attributes.len() {
            return Err(invalid(format!(
                "Category '{}' declares an attribute id twice",
                node.slug_path
            )));
        }

        let grouped = grouped_members(node.attributes.iter());
        let is_variant = |d: &AttributeDefinition| d.variant || grouped.contains(&d.id);

        let mut keys = HashSet::with_capacity(node.attributes.len());
        let mut member_owner: HashMap<Uuid, Uuid> = HashMap::new();

        for definition in &node.attributes {
            let at = || format!("'{}' on '{}'", definition.key, node.slug_path);

            if definition.category_id != node.id {
                return Err(invalid(format!("Attribute {} belongs to another category", at())));
            }
            if !KEY_REGEX.is_match(&definition.key) {
                return Err(invalid(format!("Attribute key {} is not a valid key", at())));
            }
            if !keys.insert(definition.key.as_str()) || inherited.contains(definition.key.as_str()) {
                return Err(invalid(format!("Attribute key {} is not unique", at())));
            }

            let descriptor = registry::descriptor(definition.tag());
            if definition.variant && !descriptor.variant_capable {
                return Err(invalid(format!(
                    "Attribute {} of kind {} cannot be a variant axis",
                    at(),
                    definition.tag()
                )));
            }

            match &definition.kind {
                AttributeKind::Int { bounds, .. } => {
                    check_bounds(bounds, &at())?;
                    let integral = |v: Option<rust_decimal::Decimal>| {
                        v.map_or(true, |v| v.fract().is_zero())
                    };
                    if !integral(bounds.min) || !integral(bounds.max) {
                        return Err(invalid(format!("Int bounds of {} must be integers", at())));
                    }
                }
                AttributeKind::Decimal { bounds, .. } => check_bounds(bounds, &at())?,
                AttributeKind::String { pattern } => {
                    if let Some(pattern) = pattern {
                        Regex::new(pattern).map_err(|e| {
                            invalid(format!("Pattern of {} does not compile: {}", at(), e))
                        })?;
                    }
                }
                AttributeKind::Bool | AttributeKind::Date => {}
                AttributeKind::Group { members } => {
                    if !definition.variant {
                        return Err(invalid(format!("Group {} must be a variant axis", at())));
                    }
                    if members.is_empty() {
                        return Err(invalid(format!("Group {} has no members", at())));
                    }
                    for member_id in members {
                        let member = by_id.get(member_id).ok_or_else(|| {
                            invalid(format!(
                                "Group {} references member {} outside its category",
                                at(),
                                member_id
                            ))
                        })?;
                        if !registry::descriptor(member.tag()).group_member_capable {
                            return Err(invalid(format!(
                                "Group {} cannot nest {} attribute '{}'",
                                at(),
                                member.tag(),
                                member.key
                            )));
                        }
                        if member.variant {
                            return Err(invalid(format!(
                                "Member '{}' of group {} cannot declare its own variant flag",
                                member.key,
                                at()
                            )));
                        }
                        if member_owner.insert(*member_id, definition.id).is_some() {
                            return Err(invalid(format!(
                                "Attribute '{}' is nested in more than one group",
                                member.key
                            )));
                        }
                    }
                }
                AttributeKind::Enum {
                    depends_on,
                    options,
                } => {
                    let parent_options: HashSet<Uuid> = match depends_on {
                        Some(parent_id) => {
                            let parent = by_id.get(parent_id).ok_or_else(|| {
                                invalid(format!(
                                    "Attribute {} depends on {} outside its category",
                                    at(),
                                    parent_id
                                ))
                            })?;
                            if parent.id == definition.id
                                || !matches!(parent.kind, AttributeKind::Enum { .. })
                            {
                                return Err(invalid(format!(
                                    "Attribute {} must depend on another enum attribute",
                                    at()
                                )));
                            }
                            if !is_variant(definition) && is_variant(*parent) {
                                return Err(invalid(format!(
                                    "Listing attribute {} cannot depend on variant attribute '{}'",
                                    at(),
                                    parent.key
                                )));
                            }
                            parent.options().iter().map(|o| o.id).collect()
                        }
                        None => HashSet::new(),
                    };

                    let mut codes = HashSet::with_capacity(options.len());
                    for option in options {
                        if option.attribute_id != definition.id {
                            return Err(invalid(format!(
                                "Option '{}' of {} belongs to another attribute",
                                option.code,
                                at()
                            )));
                        }
                        if !CODE_REGEX.is_match(&option.code) || !codes.insert(option.code.as_str()) {
                            return Err(invalid(format!(
                                "Option code '{}' of {} is invalid or not unique",
                                option.code,
                                at()
                            )));
                        }
                        if let Some(parent_option_id) = option.parent_option_id {
                            if !parent_options.contains(&parent_option_id) {
                                return Err(invalid(format!(
                                    "Option '{}' of {} is scoped under an option of another attribute",
                                    option.code,
                                    at()
                                )));
                            }
                        }
                    }
                }
                AttributeKind::Lookup { lookup_type_id, .. } => {
                    let lookup_type = self.lookups.lookup_type(*lookup_type_id).ok_or_else(|| {
                        invalid(format!(
                            "Attribute {} binds unknown lookup type {}",
                            at(),
                            lookup_type_id
                        ))
                    })?;
                    if definition.variant && !lookup_type.variant_allowed {
                        return Err(invalid(format!(
                            "Lookup type '{}' bound by {} does not allow variant use",
                            lookup_type.key,
                            at()
                        )));
                    }
                }
            }
        }

        check_dependency_cycles(node, &by_id)?;

        Ok(())
    }

    /// A listing-level lookup may not be linked under a lookup chosen per variant.
    ///
    /// `chain` is root first; the last node is the one being checked.
    fn check_link_passes(&self, chain: &[&CategoryNode]) -> Result<()> {
        let definitions: Vec<&AttributeDefinition> =
            chain.iter().flat_map(|n| n.attributes.iter()).collect();
        let grouped = grouped_members(definitions.iter().copied());
        let is_variant = |d: &AttributeDefinition| d.variant || grouped.contains(&d.id);

        let variant_types: HashMap<Uuid, &AttributeDefinition> = definitions
            .iter()
            .filter(|&&d| is_variant(d))
            .filter_map(|d| d.lookup_type_id().map(|t| (t, *d)))
            .collect();

        for definition in definitions.iter().filter(|&&d| !is_variant(d)) {
            let Some(lookup_type_id) = definition.lookup_type_id() else {
                continue;
            };
            for parent_type_id in self.lookups.parent_types_of(lookup_type_id) {
                if let Some(parent) = variant_types.get(parent_type_id) {
                    return Err(invalid(format!(
                        "Listing attribute '{}' is linked under variant attribute '{}'",
                        definition.key, parent.key
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_allow_entries(&self, node: &CategoryNode) -> Result<()> {
        for entry in &node.allow_entries {
            if entry.category_id != node.id {
                return Err(invalid(format!(
                    "Allow entry on '{}' names another category",
                    node.slug_path
                )));
            }
            match self.lookups.option(entry.lookup_option_id) {
                Some(option) if option.lookup_type_id == entry.lookup_type_id => {}
                _ => {
                    return Err(invalid(format!(
                        "Allow entry on '{}' references option {} outside lookup type {}",
                        node.slug_path, entry.lookup_option_id, entry.lookup_type_id
                    )))
                }
            }
        }
        Ok(())
    }
}

/// Materialized slug path for a node below `ancestors` (root first)
pub fn slug_path_of(ancestors: &[&CategoryNode], slug: &str) -> String {
    ancestors
        .iter()
        .map(|a| a.slug.as_str())
        .chain(std::iter::once(slug))
        .collect::<Vec<_>>()
        .join(&SLUG_PATH_SEPARATOR.to_string())
}

/// Root-first ancestors of a node, failing on missing parents and cycles
fn ancestors_of<'n>(
    node: &CategoryNode,
    by_id: &HashMap<Uuid, &'n CategoryNode>,
) -> Result<Vec<&'n CategoryNode>> {
    let mut ancestors = Vec::new();
    let mut visited = HashSet::from([node.id]);
    let mut cursor = node.parent_id;

    while let Some(parent_id) = cursor {
        let parent = by_id.get(&parent_id).ok_or_else(|| {
            invalid(format!(
                "Category '{}' references unknown parent {}",
                node.slug, parent_id
            ))
        })?;
        if !visited.insert(parent.id) {
            return Err(invalid(format!(
                "Category '{}' is part of a parent cycle",
                node.slug
            )));
        }
        ancestors.push(*parent);
        cursor = parent.parent_id;
    }

    ancestors.reverse();
    Ok(ancestors)
}

fn grouped_members<'d>(definitions: impl Iterator<Item = &'d AttributeDefinition>) -> HashSet<Uuid> {
    definitions
        .filter_map(|d| match &d.kind {
            AttributeKind::Group { members } => Some(members.iter().copied()),
            _ => None,
        })
        .flatten()
        .collect()
}

fn check_bounds(bounds: &NumericBounds, at: &str) -> Result<()> {
    match (bounds.min, bounds.max) {
        (Some(min), Some(max)) if min > max => Err(invalid(format!(
            "Bounds of {} have min {} above max {}",
            at, min, max
        ))),
        _ => Ok(()),
    }
}

fn check_dependency_cycles(
    node: &CategoryNode,
    by_id: &HashMap<Uuid, &AttributeDefinition>,
) -> Result<()> {
    for definition in &node.attributes {
        let mut visited = HashSet::from([definition.id]);
        let mut cursor = definition.depends_on();
        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id) {
                return Err(invalid(format!(
                    "Attribute '{}' on '{}' is part of a dependency cycle",
                    definition.key, node.slug_path
                )));
            }
            cursor = by_id.get(&parent_id).and_then(|d| d.depends_on());
        }
    }
    Ok(())
}

fn invalid(message: String) -> AppError {
    AppError::InvalidSchema(message)
}
