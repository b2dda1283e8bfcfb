use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::attributes::models::AttributeOption;
use crate::features::lookups::models::LookupConstraint;

/// Kind discriminant of an attribute definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKindTag {
    Int,
    Decimal,
    String,
    Bool,
    Date,
    Group,
    Enum,
    Lookup,
}

impl std::fmt::Display for AttributeKindTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeKindTag::Int => write!(f, "int"),
            AttributeKindTag::Decimal => write!(f, "decimal"),
            AttributeKindTag::String => write!(f, "string"),
            AttributeKindTag::Bool => write!(f, "bool"),
            AttributeKindTag::Date => write!(f, "date"),
            AttributeKindTag::Group => write!(f, "group"),
            AttributeKindTag::Enum => write!(f, "enum"),
            AttributeKindTag::Lookup => write!(f, "lookup"),
        }
    }
}

/// Inclusive numeric bounds for Int and Decimal attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
}

impl NumericBounds {
    pub fn new(min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: &Decimal) -> bool {
        self.min.map_or(true, |min| *value >= min) && self.max.map_or(true, |max| *value <= max)
    }

    pub fn describe(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => format!("between {} and {}", min, max),
            (Some(min), None) => format!("at least {}", min),
            (None, Some(max)) => format!("at most {}", max),
            (None, None) => "unbounded".to_string(),
        }
    }
}

/// Kind-indexed payload of an attribute definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeKind {
    Int {
        #[serde(default)]
        bounds: NumericBounds,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    Decimal {
        #[serde(default)]
        bounds: NumericBounds,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    Bool,
    Date,
    Group {
        members: Vec<Uuid>,
    },
    Enum {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depends_on: Option<Uuid>,
        #[serde(default)]
        options: Vec<AttributeOption>,
    },
    Lookup {
        lookup_type_id: Uuid,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        constraint_override: Option<LookupConstraint>,
    },
}

impl AttributeKind {
    pub fn tag(&self) -> AttributeKindTag {
        match self {
            AttributeKind::Int { .. } => AttributeKindTag::Int,
            AttributeKind::Decimal { .. } => AttributeKindTag::Decimal,
            AttributeKind::String { .. } => AttributeKindTag::String,
            AttributeKind::Bool => AttributeKindTag::Bool,
            AttributeKind::Date => AttributeKindTag::Date,
            AttributeKind::Group { .. } => AttributeKindTag::Group,
            AttributeKind::Enum { .. } => AttributeKindTag::Enum,
            AttributeKind::Lookup { .. } => AttributeKindTag::Lookup,
        }
    }
}

/// A typed field declared on a category and inherited by its descendants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub id: Uuid,
    pub category_id: Uuid,
    pub key: String,
    pub label: String,
    pub position: i32,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub variant: bool,
    #[serde(flatten)]
    pub kind: AttributeKind,
}

impl AttributeDefinition {
    pub fn tag(&self) -> AttributeKindTag {
        self.kind.tag()
    }

    pub fn options(&self) -> &[AttributeOption] {
        match &self.kind {
            AttributeKind::Enum { options, .. } => options,
            _ => &[],
        }
    }

    pub fn depends_on(&self) -> Option<Uuid> {
        match &self.kind {
            AttributeKind::Enum { depends_on, .. } => *depends_on,
            _ => None,
        }
    }

    pub fn group_members(&self) -> &[Uuid] {
        match &self.kind {
            AttributeKind::Group { members } => members,
            _ => &[],
        }
    }

    pub fn lookup_type_id(&self) -> Option<Uuid> {
        match &self.kind {
            AttributeKind::Lookup { lookup_type_id, .. } => Some(*lookup_type_id),
            _ => None,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match &self.kind {
            AttributeKind::Int { unit, .. } | AttributeKind::Decimal { unit, .. } => {
                unit.as_deref()
            }
            _ => None,
        }
    }
}
