use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::features::attributes::models::{AttributeAssignment, TypedValue, ValidationPass};

/// Group an accepted member assignment is nested in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: Uuid,
    pub key: String,
    pub label: String,
    pub position: i32,
}

/// An assignment that passed validation, with its normalized value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedAssignment {
    pub attribute_id: Uuid,
    pub attribute_key: String,
    pub attribute_label: String,
    pub position: i32,
    pub value: TypedValue,
    /// Option label for Enum/Lookup values, canonical value plus unit otherwise
    pub value_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupRef>,
}

impl ValidatedAssignment {
    /// Normalized raw assignment, as persisted and as re-submitted on edit
    pub fn to_assignment(&self) -> AttributeAssignment {
        match &self.value {
            TypedValue::Option(chosen) => AttributeAssignment::option(self.attribute_id, chosen.id),
            TypedValue::Lookup(chosen) => AttributeAssignment::lookup(self.attribute_id, chosen.id),
            scalar => AttributeAssignment::scalar(self.attribute_id, scalar.canonical()),
        }
    }
}

/// Result of one validation pass, in schema presentation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedAttributes {
    pub pass: ValidationPass,
    pub assignments: Vec<ValidatedAssignment>,
}

impl ValidatedAttributes {
    pub fn get(&self, attribute_id: Uuid) -> Option<&ValidatedAssignment> {
        self.assignments.iter().find(|a| a.attribute_id == attribute_id)
    }

    pub fn to_assignments(&self) -> Vec<AttributeAssignment> {
        self.assignments.iter().map(|a| a.to_assignment()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
