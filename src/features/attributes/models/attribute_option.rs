use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A selectable value of an Enum attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOption {
    pub id: Uuid,
    pub attribute_id: Uuid,
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub position: i32,
    /// Option of the DependsOn attribute this option is scoped under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_option_id: Option<Uuid>,
}
