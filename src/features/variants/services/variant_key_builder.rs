use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AssignmentErrorKind, AssignmentValidationError};
use crate::features::attributes::models::TypedValue;
use crate::features::validation::models::ValidatedAssignment;
use crate::features::variants::models::{AxisSnapshot, AxisValue, SelectionSnapshot, VariantKey};
use crate::shared::constants::{
    VARIANT_AXIS_DELIMITER, VARIANT_ESCAPE, VARIANT_KEY_VALUE_SEPARATOR, VARIANT_MEMBER_ASSIGN,
    VARIANT_MEMBER_DELIMITER,
};

const RESERVED: [char; 5] = [
    VARIANT_AXIS_DELIMITER,
    VARIANT_KEY_VALUE_SEPARATOR,
    VARIANT_MEMBER_DELIMITER,
    VARIANT_MEMBER_ASSIGN,
    VARIANT_ESCAPE,
];

/// One axis while a key is assembled: a plain attribute or a whole group
struct Axis<'v> {
    id: Uuid,
    key: &'v str,
    label: &'v str,
    position: i32,
    grouped: bool,
    values: Vec<&'v ValidatedAssignment>,
}

/// Derives variant keys and selection snapshots from validated variant values
#[derive(Debug, Clone, Copy)]
pub struct VariantKeyBuilder {
    decimal_scale: u32,
}

impl VariantKeyBuilder {
    pub fn new(decimal_scale: u32) -> Self {
        Self { decimal_scale }
    }

    /// Build the canonical key and a label snapshot for one variant.
    ///
    /// Input order does not matter: axes are sorted by (position, id), and
    /// group members by the same rule inside their group.
    pub fn build_key(
        &self,
        assignments: &[ValidatedAssignment],
        category_version: i64,
    ) -> (VariantKey, SelectionSnapshot) {
        let axes = collect_axes(assignments);

        let tokens: Vec<String> = axes
            .iter()
            .map(|axis| {
                let value = if axis.grouped {
                    axis.values
                        .iter()
                        .map(|v| {
                            format!(
                                "{}{}{}",
                                escape(&v.attribute_key),
                                VARIANT_MEMBER_ASSIGN,
                                escape(&self.format_value(&v.value))
                            )
                        })
                        .collect::<Vec<_>>()
                        .join(&VARIANT_MEMBER_DELIMITER.to_string())
                } else {
                    axis.values
                        .first()
                        .map(|v| escape(&self.format_value(&v.value)))
                        .unwrap_or_default()
                };
                format!("{}{}{}", escape(axis.key), VARIANT_KEY_VALUE_SEPARATOR, value)
            })
            .collect();

        let snapshot = SelectionSnapshot {
            captured_at: Utc::now(),
            category_version,
            axes: axes
                .iter()
                .map(|axis| AxisSnapshot {
                    attribute_id: axis.id,
                    key: axis.key.to_string(),
                    label: axis.label.to_string(),
                    values: axis
                        .values
                        .iter()
                        .map(|v| AxisValue {
                            attribute_id: v.attribute_id,
                            key: v.attribute_key.clone(),
                            label: v.attribute_label.clone(),
                            value: self.format_value(&v.value),
                            value_label: v.value_label.clone(),
                        })
                        .collect(),
                })
                .collect(),
        };

        (
            VariantKey::new(tokens.join(&VARIANT_AXIS_DELIMITER.to_string())),
            snapshot,
        )
    }

    /// Duplicate keys within a submission, and against keys already stored
    /// for the listing. The first occurrence inside the submission wins.
    pub fn check_unique(
        &self,
        keys: &[VariantKey],
        existing: &[VariantKey],
    ) -> Vec<AssignmentValidationError> {
        let existing: HashSet<&VariantKey> = existing.iter().collect();
        let mut seen: HashSet<&VariantKey> = HashSet::with_capacity(keys.len());
        let mut errors = Vec::new();

        for (index, key) in keys.iter().enumerate() {
            let message = if existing.contains(key) {
                "A variant with the same axis values already exists on this listing"
            } else if !seen.insert(key) {
                "Another variant in this submission has the same axis values"
            } else {
                continue;
            };
            errors.push(
                AssignmentValidationError::new(
                    "variant",
                    AssignmentErrorKind::DuplicateVariantKey,
                    Some(key.to_string()),
                    message,
                )
                .for_variant(index),
            );
        }

        errors
    }

    /// Canonical text of a value; Decimals always carry the fixed scale
    fn format_value(&self, value: &TypedValue) -> String {
        match value {
            TypedValue::Decimal(d) => {
                let mut fixed = *d;
                fixed.rescale(self.decimal_scale);
                fixed.to_string()
            }
            other => other.canonical(),
        }
    }
}

fn collect_axes(assignments: &[ValidatedAssignment]) -> Vec<Axis<'_>> {
    let mut axes: Vec<Axis<'_>> = Vec::new();

    for assignment in assignments {
        let (id, key, label, position, grouped) = match &assignment.group {
            Some(group) => (group.id, group.key.as_str(), group.label.as_str(), group.position, true),
            None => (
                assignment.attribute_id,
                assignment.attribute_key.as_str(),
                assignment.attribute_label.as_str(),
                assignment.position,
                false,
            ),
        };

        match axes.iter_mut().find(|a| a.id == id) {
            Some(axis) => axis.values.push(assignment),
            None => axes.push(Axis {
                id,
                key,
                label,
                position,
                grouped,
                values: vec![assignment],
            }),
        }
    }

    axes.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.id.cmp(&b.id)));
    for axis in &mut axes {
        axis.values.sort_by(|a, b| {
            a.position
                .cmp(&b.position)
                .then_with(|| a.attribute_id.cmp(&b.attribute_id))
        });
    }

    axes
}

fn escape(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len());
    for c in token.chars() {
        if RESERVED.contains(&c) {
            escaped.push(VARIANT_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
