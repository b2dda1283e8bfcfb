use std::collections::{HashMap, HashSet};

use regex::Regex;
use uuid::Uuid;

use crate::features::attributes::models::{
    AttributeDefinition, AttributeKind, AttributeOption, ValidationPass,
};
use crate::features::categories::models::CategoryNode;

/// Allow-list for one lookup type, as found at the nearest ancestor declaring one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    pub source_category_id: Uuid,
    pub options: HashSet<Uuid>,
}

/// Lookup allow-lists keyed by lookup type, nearest ancestor wins
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowListIndex {
    lists: HashMap<Uuid, AllowList>,
}

impl AllowListIndex {
    /// Build from a root-first ancestor chain.
    ///
    /// Each node that declares entries for a lookup type replaces whatever an
    /// ancestor declared for that type.
    pub fn from_chain(chain: &[CategoryNode]) -> Self {
        let mut lists: HashMap<Uuid, AllowList> = HashMap::new();

        for node in chain {
            let mut declared: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
            for entry in node.allow_entries.iter().filter(|e| e.category_id == node.id) {
                declared
                    .entry(entry.lookup_type_id)
                    .or_default()
                    .insert(entry.lookup_option_id);
            }
            for (lookup_type_id, options) in declared {
                lists.insert(
                    lookup_type_id,
                    AllowList {
                        source_category_id: node.id,
                        options,
                    },
                );
            }
        }

        Self { lists }
    }

    pub fn get(&self, lookup_type_id: Uuid) -> Option<&AllowList> {
        self.lists.get(&lookup_type_id)
    }

    /// False when no allow-list exists for the type
    pub fn allows(&self, lookup_type_id: Uuid, option_id: Uuid) -> bool {
        self.lists
            .get(&lookup_type_id)
            .is_some_and(|list| list.options.contains(&option_id))
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Attribute schema of a category after inheritance is applied.
///
/// Definitions are stored in presentation order (position, then depth with
/// the ancestor-most first, then id); options, group membership and compiled
/// patterns are flat id-keyed arenas over those definitions.
#[derive(Debug, Clone)]
pub struct EffectiveSchema {
    pub category_id: Uuid,
    pub category_version: i64,
    pub slug_path: String,
    definitions: Vec<AttributeDefinition>,
    index: HashMap<Uuid, usize>,
    options: HashMap<Uuid, AttributeOption>,
    group_of: HashMap<Uuid, Uuid>,
    patterns: HashMap<Uuid, Regex>,
    allow_list: AllowListIndex,
}

impl EffectiveSchema {
    /// `definitions` pairs each definition with the depth of its owning category (root = 0)
    pub fn new(
        leaf: &CategoryNode,
        definitions: Vec<(usize, AttributeDefinition)>,
        allow_list: AllowListIndex,
    ) -> Self {
        let mut definitions = definitions;
        definitions.sort_by(|(da, a), (db, b)| {
            a.position
                .cmp(&b.position)
                .then_with(|| da.cmp(db))
                .then_with(|| a.id.cmp(&b.id))
        });
        let definitions: Vec<AttributeDefinition> =
            definitions.into_iter().map(|(_, d)| d).collect();

        let mut index = HashMap::with_capacity(definitions.len());
        let mut options = HashMap::new();
        let mut group_of = HashMap::new();
        let mut patterns = HashMap::new();

        for (i, definition) in definitions.iter().enumerate() {
            index.insert(definition.id, i);
            match &definition.kind {
                AttributeKind::Enum { options: opts, .. } => {
                    for option in opts {
                        options.insert(option.id, option.clone());
                    }
                }
                AttributeKind::Group { members } => {
                    for member in members {
                        group_of.insert(*member, definition.id);
                    }
                }
                AttributeKind::String {
                    pattern: Some(pattern),
                } => match Regex::new(&format!("^(?:{})$", pattern)) {
                    Ok(regex) => {
                        patterns.insert(definition.id, regex);
                    }
                    Err(e) => {
                        // Values of this attribute will be rejected as pattern mismatches
                        tracing::warn!(
                            "Invalid pattern on attribute '{}': {}",
                            definition.key,
                            e
                        );
                    }
                },
                _ => {}
            }
        }

        Self {
            category_id: leaf.id,
            category_version: leaf.version,
            slug_path: leaf.slug_path.clone(),
            definitions,
            index,
            options,
            group_of,
            patterns,
            allow_list,
        }
    }

    pub fn definitions(&self) -> &[AttributeDefinition] {
        &self.definitions
    }

    pub fn definition(&self, id: Uuid) -> Option<&AttributeDefinition> {
        self.index.get(&id).map(|&i| &self.definitions[i])
    }

    pub fn option(&self, id: Uuid) -> Option<&AttributeOption> {
        self.options.get(&id)
    }

    /// Group a definition is nested in, if any
    pub fn group_of(&self, member_id: Uuid) -> Option<&AttributeDefinition> {
        self.group_of
            .get(&member_id)
            .and_then(|group_id| self.definition(*group_id))
    }

    /// Members of a group in declaration order
    pub fn members(&self, group: &AttributeDefinition) -> Vec<&AttributeDefinition> {
        group
            .group_members()
            .iter()
            .filter_map(|id| self.definition(*id))
            .collect()
    }

    /// Group members follow their group; the group decides variance as a whole
    pub fn pass_of(&self, definition: &AttributeDefinition) -> ValidationPass {
        match self.group_of(definition.id) {
            Some(group) => ValidationPass::from_variant_flag(group.variant),
            None => ValidationPass::from_variant_flag(definition.variant),
        }
    }

    /// Definitions that appear at top level in a pass, group members excluded
    pub fn top_level(&self, pass: ValidationPass) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions
            .iter()
            .filter(move |d| !self.group_of.contains_key(&d.id) && self.pass_of(d) == pass)
    }

    pub fn pattern(&self, attribute_id: Uuid) -> Option<&Regex> {
        self.patterns.get(&attribute_id)
    }

    pub fn allow_list(&self) -> &AllowListIndex {
        &self.allow_list
    }

    /// Lookup types bound by any definition, sorted and deduplicated
    pub fn lookup_type_ids(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self
            .definitions
            .iter()
            .filter_map(|d| d.lookup_type_id())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}
