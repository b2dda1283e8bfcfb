use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::constants::DATE_FORMAT;

/// Which value slot of an assignment is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSlot {
    Scalar,
    Option,
    Lookup,
}

impl std::fmt::Display for ValueSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSlot::Scalar => write!(f, "scalar value"),
            ValueSlot::Option => write!(f, "option"),
            ValueSlot::Lookup => write!(f, "lookup option"),
        }
    }
}

/// Whether a validation run covers listing-level or variant-level attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPass {
    Listing,
    Variant,
}

impl ValidationPass {
    pub fn from_variant_flag(is_variant_pass: bool) -> Self {
        if is_variant_pass {
            ValidationPass::Variant
        } else {
            ValidationPass::Listing
        }
    }

    pub fn is_variant(self) -> bool {
        self == ValidationPass::Variant
    }
}

impl std::fmt::Display for ValidationPass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationPass::Listing => write!(f, "listing"),
            ValidationPass::Variant => write!(f, "variant"),
        }
    }
}

/// A raw value proposed by a seller for one attribute definition.
///
/// Exactly one slot must be populated, and it must match the kind of the
/// referenced definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeAssignment {
    pub attribute_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_option_id: Option<Uuid>,
}

impl AttributeAssignment {
    pub fn scalar(attribute_id: Uuid, value: impl Into<String>) -> Self {
        Self {
            attribute_id,
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn option(attribute_id: Uuid, option_id: Uuid) -> Self {
        Self {
            attribute_id,
            option_id: Some(option_id),
            ..Default::default()
        }
    }

    pub fn lookup(attribute_id: Uuid, lookup_option_id: Uuid) -> Self {
        Self {
            attribute_id,
            lookup_option_id: Some(lookup_option_id),
            ..Default::default()
        }
    }

    pub fn filled_slots(&self) -> Vec<ValueSlot> {
        let mut slots = Vec::with_capacity(1);
        if self.value.is_some() {
            slots.push(ValueSlot::Scalar);
        }
        if self.option_id.is_some() {
            slots.push(ValueSlot::Option);
        }
        if self.lookup_option_id.is_some() {
            slots.push(ValueSlot::Lookup);
        }
        slots
    }

    /// Raw value as reported back in validation errors
    pub fn raw_value(&self) -> Option<String> {
        self.value
            .clone()
            .or_else(|| self.option_id.map(|id| id.to_string()))
            .or_else(|| self.lookup_option_id.map(|id| id.to_string()))
    }
}

/// Option or lookup option picked for an assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChosenOption {
    pub id: Uuid,
    pub code: String,
}

/// Normalized, typed value of an accepted assignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    Int(i64),
    Decimal(Decimal),
    String(String),
    Bool(bool),
    Date(NaiveDate),
    Option(ChosenOption),
    Lookup(ChosenOption),
}

impl TypedValue {
    /// Canonical text form; Enum and Lookup values use their code, never the id
    pub fn canonical(&self) -> String {
        match self {
            TypedValue::Int(v) => v.to_string(),
            TypedValue::Decimal(v) => v.to_string(),
            TypedValue::String(v) => v.clone(),
            TypedValue::Bool(v) => v.to_string(),
            TypedValue::Date(v) => v.format(DATE_FORMAT).to_string(),
            TypedValue::Option(o) | TypedValue::Lookup(o) => o.code.clone(),
        }
    }

    pub fn chosen_id(&self) -> Option<Uuid> {
        match self {
            TypedValue::Option(o) | TypedValue::Lookup(o) => Some(o.id),
            _ => None,
        }
    }
}
