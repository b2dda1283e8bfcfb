mod assignment;
mod attribute_definition;
mod attribute_option;

pub use assignment::{AttributeAssignment, ChosenOption, TypedValue, ValidationPass, ValueSlot};
pub use attribute_definition::{
    AttributeDefinition, AttributeKind, AttributeKindTag, NumericBounds,
};
pub use attribute_option::AttributeOption;
