use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::features::attributes::models::{AttributeKindTag, TypedValue, ValueSlot};
use crate::shared::constants::DATE_FORMAT;

/// Static description of how one attribute kind is populated and parsed.
#[derive(Debug, Clone, Copy)]
pub struct KindDescriptor {
    pub tag: AttributeKindTag,
    /// Slot an assignment must fill, `None` for kinds that carry no value themselves
    pub slot: Option<ValueSlot>,
    /// Whether a definition of this kind may be flagged as a variant axis
    pub variant_capable: bool,
    /// Whether a definition of this kind may be nested in a group
    pub group_member_capable: bool,
    /// Parser for the raw scalar text, only set for scalar kinds
    pub parse: Option<fn(&str) -> Option<TypedValue>>,
}

const INT: KindDescriptor = KindDescriptor {
    tag: AttributeKindTag::Int,
    slot: Some(ValueSlot::Scalar),
    variant_capable: true,
    group_member_capable: true,
    parse: Some(parse_int),
};

const DECIMAL: KindDescriptor = KindDescriptor {
    tag: AttributeKindTag::Decimal,
    slot: Some(ValueSlot::Scalar),
    variant_capable: true,
    group_member_capable: true,
    parse: Some(parse_decimal),
};

const STRING: KindDescriptor = KindDescriptor {
    tag: AttributeKindTag::String,
    slot: Some(ValueSlot::Scalar),
    variant_capable: false,
    group_member_capable: true,
    parse: Some(parse_string),
};

const BOOL: KindDescriptor = KindDescriptor {
    tag: AttributeKindTag::Bool,
    slot: Some(ValueSlot::Scalar),
    variant_capable: false,
    group_member_capable: true,
    parse: Some(parse_bool),
};

const DATE: KindDescriptor = KindDescriptor {
    tag: AttributeKindTag::Date,
    slot: Some(ValueSlot::Scalar),
    variant_capable: false,
    group_member_capable: true,
    parse: Some(parse_date),
};

const GROUP: KindDescriptor = KindDescriptor {
    tag: AttributeKindTag::Group,
    slot: None,
    variant_capable: true,
    group_member_capable: false,
    parse: None,
};

const ENUM: KindDescriptor = KindDescriptor {
    tag: AttributeKindTag::Enum,
    slot: Some(ValueSlot::Option),
    variant_capable: true,
    group_member_capable: true,
    parse: None,
};

const LOOKUP: KindDescriptor = KindDescriptor {
    tag: AttributeKindTag::Lookup,
    slot: Some(ValueSlot::Lookup),
    variant_capable: true,
    group_member_capable: true,
    parse: None,
};

/// All attribute kinds. This is the single source of truth.
pub const KIND_REGISTRY: &[KindDescriptor] =
    &[INT, DECIMAL, STRING, BOOL, DATE, GROUP, ENUM, LOOKUP];

/// Descriptor for a kind tag
pub fn descriptor(tag: AttributeKindTag) -> &'static KindDescriptor {
    match tag {
        AttributeKindTag::Int => &INT,
        AttributeKindTag::Decimal => &DECIMAL,
        AttributeKindTag::String => &STRING,
        AttributeKindTag::Bool => &BOOL,
        AttributeKindTag::Date => &DATE,
        AttributeKindTag::Group => &GROUP,
        AttributeKindTag::Enum => &ENUM,
        AttributeKindTag::Lookup => &LOOKUP,
    }
}

/// Parse raw scalar text for a kind, `None` when the text does not fit the kind
pub fn parse_scalar(tag: AttributeKindTag, raw: &str) -> Option<TypedValue> {
    descriptor(tag).parse.and_then(|parse| parse(raw))
}

fn parse_int(raw: &str) -> Option<TypedValue> {
    raw.trim().parse::<i64>().ok().map(TypedValue::Int)
}

fn parse_decimal(raw: &str) -> Option<TypedValue> {
    Decimal::from_str(raw.trim()).ok().map(TypedValue::Decimal)
}

fn parse_string(raw: &str) -> Option<TypedValue> {
    Some(TypedValue::String(raw.to_string()))
}

fn parse_bool(raw: &str) -> Option<TypedValue> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(TypedValue::Bool(true)),
        "false" | "0" => Some(TypedValue::Bool(false)),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<TypedValue> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .ok()
        .map(TypedValue::Date)
}
