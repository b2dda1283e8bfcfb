use rust_decimal::Decimal;
use uuid::Uuid;

use crate::features::attributes::models::{
    AttributeDefinition, AttributeKind, AttributeOption, NumericBounds,
};
use crate::features::categories::models::{CategoryNode, CategoryState};
use crate::features::lookups::models::{
    LookupAllowEntry, LookupConstraint, LookupLink, LookupOption, LookupType,
};
use crate::shared::constants::SLUG_PATH_SEPARATOR;

fn label_of(key: &str) -> String {
    let mut label = key.replace('_', " ");
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    label
}

pub fn lookup_type(key: &str, constraint: LookupConstraint) -> LookupType {
    LookupType {
        id: Uuid::new_v4(),
        key: key.to_string(),
        label: label_of(key),
        constraint,
        variant_allowed: true,
    }
}

pub fn lookup_option(lookup_type: &LookupType, code: &str, position: i32) -> LookupOption {
    LookupOption {
        id: Uuid::new_v4(),
        lookup_type_id: lookup_type.id,
        code: code.to_string(),
        label: label_of(code),
        position,
    }
}

pub fn lookup_link(parent: &LookupOption, child: &LookupOption) -> LookupLink {
    LookupLink {
        parent_type_id: parent.lookup_type_id,
        parent_option_id: parent.id,
        child_type_id: child.lookup_type_id,
        child_option_id: child.id,
    }
}

pub fn allow(category_id: Uuid, option: &LookupOption) -> LookupAllowEntry {
    LookupAllowEntry {
        category_id,
        lookup_type_id: option.lookup_type_id,
        lookup_option_id: option.id,
    }
}

/// Published container category
pub fn root_category(slug: &str) -> CategoryNode {
    CategoryNode {
        id: Uuid::new_v4(),
        parent_id: None,
        name: label_of(slug),
        slug: slug.to_string(),
        slug_path: slug.to_string(),
        version: 1,
        state: CategoryState::Published,
        selectable: false,
        children_permitted: false,
        attributes: vec![],
        allow_entries: vec![],
    }
}

/// Published, selectable category that may still receive children
pub fn child_category(parent: &CategoryNode, slug: &str) -> CategoryNode {
    CategoryNode {
        id: Uuid::new_v4(),
        parent_id: Some(parent.id),
        name: label_of(slug),
        slug: slug.to_string(),
        slug_path: format!("{}{}{}", parent.slug_path, SLUG_PATH_SEPARATOR, slug),
        version: 1,
        state: CategoryState::Published,
        selectable: true,
        children_permitted: true,
        attributes: vec![],
        allow_entries: vec![],
    }
}

fn definition(category: &CategoryNode, key: &str, position: i32, kind: AttributeKind) -> AttributeDefinition {
    AttributeDefinition {
        id: Uuid::new_v4(),
        category_id: category.id,
        key: key.to_string(),
        label: label_of(key),
        position,
        required: false,
        variant: false,
        kind,
    }
}

pub fn int_attr(
    category: &CategoryNode,
    key: &str,
    position: i32,
    min: Option<i64>,
    max: Option<i64>,
) -> AttributeDefinition {
    definition(
        category,
        key,
        position,
        AttributeKind::Int {
            bounds: NumericBounds::new(min.map(Decimal::from), max.map(Decimal::from)),
            unit: None,
        },
    )
}

pub fn decimal_attr(
    category: &CategoryNode,
    key: &str,
    position: i32,
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> AttributeDefinition {
    definition(
        category,
        key,
        position,
        AttributeKind::Decimal {
            bounds: NumericBounds::new(min, max),
            unit: None,
        },
    )
}

pub fn string_attr(
    category: &CategoryNode,
    key: &str,
    position: i32,
    pattern: Option<&str>,
) -> AttributeDefinition {
    definition(
        category,
        key,
        position,
        AttributeKind::String {
            pattern: pattern.map(str::to_string),
        },
    )
}

pub fn bool_attr(category: &CategoryNode, key: &str, position: i32) -> AttributeDefinition {
    definition(category, key, position, AttributeKind::Bool)
}

pub fn date_attr(category: &CategoryNode, key: &str, position: i32) -> AttributeDefinition {
    definition(category, key, position, AttributeKind::Date)
}

pub fn enum_attr(
    category: &CategoryNode,
    key: &str,
    position: i32,
    codes: &[&str],
) -> AttributeDefinition {
    let mut attr = definition(
        category,
        key,
        position,
        AttributeKind::Enum {
            depends_on: None,
            options: vec![],
        },
    );
    let attribute_id = attr.id;
    if let AttributeKind::Enum { options, .. } = &mut attr.kind {
        *options = codes
            .iter()
            .enumerate()
            .map(|(i, code)| AttributeOption {
                id: Uuid::new_v4(),
                attribute_id,
                code: code.to_string(),
                label: label_of(code),
                position: i as i32,
                parent_option_id: None,
            })
            .collect();
    }
    attr
}

/// Enum whose options are each scoped under an option code of `parent`
pub fn dependent_enum_attr(
    category: &CategoryNode,
    key: &str,
    position: i32,
    parent: &AttributeDefinition,
    codes: &[(&str, &str)],
) -> AttributeDefinition {
    let plain: Vec<&str> = codes.iter().map(|(code, _)| *code).collect();
    let mut attr = enum_attr(category, key, position, &plain);
    if let AttributeKind::Enum {
        depends_on,
        options,
    } = &mut attr.kind
    {
        *depends_on = Some(parent.id);
        for (option, (_, parent_code)) in options.iter_mut().zip(codes) {
            option.parent_option_id = parent.option_id(parent_code);
        }
    }
    attr
}

pub fn lookup_attr(
    category: &CategoryNode,
    key: &str,
    position: i32,
    lookup_type: &LookupType,
) -> AttributeDefinition {
    definition(
        category,
        key,
        position,
        AttributeKind::Lookup {
            lookup_type_id: lookup_type.id,
            constraint_override: None,
        },
    )
}

/// Variant group over the given members
pub fn group_attr(
    category: &CategoryNode,
    key: &str,
    position: i32,
    members: &[&AttributeDefinition],
) -> AttributeDefinition {
    let mut attr = definition(
        category,
        key,
        position,
        AttributeKind::Group {
            members: members.iter().map(|m| m.id).collect(),
        },
    );
    attr.variant = true;
    attr
}

pub trait DefinitionExt {
    fn as_required(self) -> Self;
    fn as_variant(self) -> Self;
    fn option_id(&self, code: &str) -> Option<Uuid>;
}

impl DefinitionExt for AttributeDefinition {
    fn as_required(mut self) -> Self {
        self.required = true;
        self
    }

    fn as_variant(mut self) -> Self {
        self.variant = true;
        self
    }

    fn option_id(&self, code: &str) -> Option<Uuid> {
        self.options().iter().find(|o| o.code == code).map(|o| o.id)
    }
}
