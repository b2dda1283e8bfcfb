use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::attributes::models::AttributeDefinition;
use crate::features::lookups::models::LookupAllowEntry;

/// Lifecycle state of a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryState {
    #[default]
    Draft,
    Published,
    Retired,
}

impl std::fmt::Display for CategoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryState::Draft => write!(f, "draft"),
            CategoryState::Published => write!(f, "published"),
            CategoryState::Retired => write!(f, "retired"),
        }
    }
}

/// A node of the product-type hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    /// Ancestor slugs joined with '/', this node's slug last
    pub slug_path: String,
    /// Optimistic concurrency token, bumped on every schema-affecting edit
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub state: CategoryState,
    /// Whether sellers may list products directly under this node
    #[serde(default)]
    pub selectable: bool,
    /// Allows children under a selectable node
    #[serde(default)]
    pub children_permitted: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
    #[serde(default)]
    pub allow_entries: Vec<LookupAllowEntry>,
}

impl CategoryNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Sellers may list under published, selectable categories only
    pub fn is_listable(&self) -> bool {
        self.selectable && self.state == CategoryState::Published
    }

    pub fn accepts_children(&self) -> bool {
        !self.selectable || self.children_permitted
    }
}
