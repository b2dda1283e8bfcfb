use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the options of a lookup type may be used in a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupConstraint {
    /// Every option of the type is valid unless narrowed elsewhere
    #[default]
    Open,
    /// Only options present in the nearest ancestor allow-list are valid
    RequireAllowList,
}

impl std::fmt::Display for LookupConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupConstraint::Open => write!(f, "open"),
            LookupConstraint::RequireAllowList => write!(f, "require_allow_list"),
        }
    }
}

/// A global, reusable dictionary such as "brand" or "device_model"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupType {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub constraint: LookupConstraint,
    #[serde(default)]
    pub variant_allowed: bool,
}

/// A discrete value of a lookup type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub id: Uuid,
    pub lookup_type_id: Uuid,
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub position: i32,
}
