use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::categories::models::{CategoryNode, CategoryState};

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub slug_path: String,
    pub state: CategoryState,
    pub selectable: bool,
    pub version: i64,
}

impl From<&CategoryNode> for CategoryResponseDto {
    fn from(c: &CategoryNode) -> Self {
        Self {
            id: c.id,
            parent_id: c.parent_id,
            name: c.name.clone(),
            slug: c.slug.clone(),
            slug_path: c.slug_path.clone(),
            state: c.state,
            selectable: c.selectable,
            version: c.version,
        }
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub slug_path: String,
    pub listable: bool,
    /// Definitions declared on this node, inherited ones excluded
    pub attribute_count: usize,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build tree from flat list of categories
    pub fn build_tree(categories: &[CategoryNode]) -> Vec<CategoryTreeDto> {
        let mut roots: Vec<&CategoryNode> = categories.iter().filter(|c| c.is_root()).collect();
        roots.sort_by(|a, b| a.slug.cmp(&b.slug));

        roots
            .into_iter()
            .map(|root| Self::build_node(root, categories))
            .collect()
    }

    fn build_node(category: &CategoryNode, all_categories: &[CategoryNode]) -> CategoryTreeDto {
        let mut children: Vec<&CategoryNode> = all_categories
            .iter()
            .filter(|c| c.parent_id == Some(category.id))
            .collect();
        children.sort_by(|a, b| a.slug.cmp(&b.slug));

        CategoryTreeDto {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            slug_path: category.slug_path.clone(),
            listable: category.is_listable(),
            attribute_count: category.attributes.len(),
            children: children
                .into_iter()
                .map(|child| Self::build_node(child, all_categories))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{child_category, int_attr, root_category};

    #[test]
    fn test_build_tree_nests_children_in_slug_order() {
        let root = root_category("electronics");
        let phones = child_category(&root, "phones");
        let mut laptops = child_category(&root, "laptops");
        laptops.attributes.push(int_attr(&laptops, "ram_gb", 0, Some(1), None));
        let smartphones = child_category(&phones, "smartphones");
        let other_root = root_category("books");

        let tree = CategoryTreeDto::build_tree(&[
            smartphones,
            phones,
            root,
            laptops,
            other_root,
        ]);

        let roots: Vec<&str> = tree.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(roots, vec!["books", "electronics"]);

        let electronics = &tree[1];
        assert!(!electronics.listable);
        let children: Vec<&str> = electronics.children.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(children, vec!["laptops", "phones"]);
        assert_eq!(electronics.children[0].attribute_count, 1);
        assert_eq!(
            electronics.children[1].children[0].slug_path,
            "electronics/phones/smartphones"
        );
    }
}
