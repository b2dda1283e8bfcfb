use std::collections::{HashMap, HashSet};

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::core::error::{AssignmentErrorKind, AssignmentValidationError};
use crate::features::attributes::models::{
    AttributeAssignment, AttributeDefinition, AttributeKind, ChosenOption, NumericBounds,
    TypedValue, ValidationPass, ValueSlot,
};
use crate::features::attributes::registry;
use crate::features::categories::models::EffectiveSchema;
use crate::features::lookups::models::LookupConstraint;
use crate::features::lookups::LookupCatalog;
use crate::features::validation::models::{GroupRef, ValidatedAssignment, ValidatedAttributes};

type Errors = Vec<AssignmentValidationError>;

/// A populated value slot of a raw assignment
#[derive(Debug, Clone, Copy)]
enum Supplied<'x> {
    Scalar(&'x str),
    Option(Uuid),
    Lookup(Uuid),
}

impl Supplied<'_> {
    fn slot(&self) -> ValueSlot {
        match self {
            Supplied::Scalar(_) => ValueSlot::Scalar,
            Supplied::Option(_) => ValueSlot::Option,
            Supplied::Lookup(_) => ValueSlot::Lookup,
        }
    }

    fn collect(assignment: &AttributeAssignment) -> Vec<Supplied<'_>> {
        let mut supplied = Vec::with_capacity(1);
        if let Some(value) = assignment.value.as_deref() {
            supplied.push(Supplied::Scalar(value));
        }
        if let Some(id) = assignment.option_id {
            supplied.push(Supplied::Option(id));
        }
        if let Some(id) = assignment.lookup_option_id {
            supplied.push(Supplied::Lookup(id));
        }
        supplied
    }
}

/// Validates raw attribute assignments against an effective schema.
///
/// Pure: every input is a snapshot handed in by the caller, and every
/// problem found in a run is reported together.
pub struct AssignmentValidator<'a> {
    lookups: &'a LookupCatalog,
    decimal_scale: u32,
}

impl<'a> AssignmentValidator<'a> {
    pub fn new(lookups: &'a LookupCatalog, decimal_scale: u32) -> Self {
        Self {
            lookups,
            decimal_scale,
        }
    }

    pub fn validate(
        &self,
        schema: &EffectiveSchema,
        pass: ValidationPass,
        assignments: &[AttributeAssignment],
    ) -> Result<ValidatedAttributes, Errors> {
        self.validate_with_context(schema, pass, assignments, None)
    }

    /// Validate one pass. `context` holds values accepted in another pass
    /// (the listing, for a variant) that dependent attributes may refer to.
    pub fn validate_with_context(
        &self,
        schema: &EffectiveSchema,
        pass: ValidationPass,
        assignments: &[AttributeAssignment],
        context: Option<&ValidatedAttributes>,
    ) -> Result<ValidatedAttributes, Errors> {
        let mut errors = Vec::new();
        let mut supplied: HashSet<Uuid> = HashSet::with_capacity(assignments.len());
        let mut resolved: HashMap<Uuid, ValidatedAssignment> =
            HashMap::with_capacity(assignments.len());

        // Per-assignment checks: definition, slot, parsing, bounds, membership
        for assignment in assignments {
            let Some(definition) = definition_for(schema, pass, assignment, &mut errors) else {
                continue;
            };
            if !supplied.insert(definition.id) {
                errors.push(AssignmentValidationError::new(
                    &definition.key,
                    AssignmentErrorKind::DuplicateAttribute,
                    assignment.raw_value(),
                    format!("'{}' is assigned more than once", definition.key),
                ));
                continue;
            }
            match self.resolve(schema, definition, assignment) {
                Ok(validated) => {
                    resolved.insert(definition.id, validated);
                }
                Err(error) => errors.push(error),
            }
        }

        // Dependency and link checks, once every parent value is resolved
        for definition in schema.definitions() {
            if let Some(validated) = resolved.get(&definition.id) {
                self.check_relations(
                    schema,
                    pass,
                    definition,
                    validated,
                    &resolved,
                    &supplied,
                    context,
                    &mut errors,
                );
            }
        }

        check_coverage(schema, pass, &supplied, &mut errors);

        if !errors.is_empty() {
            tracing::debug!(
                "Rejected {} assignment(s) for '{}' ({} pass): {} error(s)",
                assignments.len(),
                schema.slug_path,
                pass,
                errors.len()
            );
            return Err(errors);
        }

        let assignments = schema
            .definitions()
            .iter()
            .filter_map(|d| resolved.remove(&d.id))
            .collect();

        Ok(ValidatedAttributes { pass, assignments })
    }

    fn resolve(
        &self,
        schema: &EffectiveSchema,
        definition: &AttributeDefinition,
        assignment: &AttributeAssignment,
    ) -> Result<ValidatedAssignment, AssignmentValidationError> {
        let raw = assignment.raw_value();
        let key = definition.key.as_str();
        let fail = |kind: AssignmentErrorKind, message: String| {
            AssignmentValidationError::new(key, kind, raw.clone(), message)
        };

        let filled = Supplied::collect(assignment);
        let expected = registry::descriptor(definition.tag()).slot;

        let (value, value_label) = match (&definition.kind, filled.as_slice()) {
            (AttributeKind::Group { .. }, _) => {
                return Err(fail(
                    AssignmentErrorKind::MalformedAssignment,
                    format!("Group '{}' takes its values through its members", key),
                ))
            }
            (_, []) => {
                return Err(fail(
                    AssignmentErrorKind::MalformedAssignment,
                    format!("'{}' has no value", key),
                ))
            }
            (_, [_, _, ..]) => {
                return Err(fail(
                    AssignmentErrorKind::MalformedAssignment,
                    format!("'{}' must fill exactly one value slot", key),
                ))
            }
            (AttributeKind::Enum { options, .. }, [Supplied::Option(id)]) => {
                let option = options.iter().find(|o| o.id == *id).ok_or_else(|| {
                    fail(
                        AssignmentErrorKind::UnknownOption,
                        format!("Option {} is not an option of '{}'", id, key),
                    )
                })?;
                let value = TypedValue::Option(ChosenOption {
                    id: option.id,
                    code: option.code.clone(),
                });
                (value, option.label.clone())
            }
            (
                AttributeKind::Lookup {
                    lookup_type_id,
                    constraint_override,
                },
                [Supplied::Lookup(id)],
            ) => {
                let option = self
                    .lookups
                    .option(*id)
                    .filter(|o| o.lookup_type_id == *lookup_type_id)
                    .ok_or_else(|| {
                        fail(
                            AssignmentErrorKind::UnknownOption,
                            format!("Lookup option {} is not a value of '{}'", id, key),
                        )
                    })?;

                let constraint = self
                    .lookups
                    .effective_constraint(*lookup_type_id, *constraint_override);
                if constraint == Some(LookupConstraint::RequireAllowList)
                    && !schema.allow_list().allows(*lookup_type_id, option.id)
                {
                    return Err(fail(
                        AssignmentErrorKind::NotInAllowList,
                        format!(
                            "'{}' is not allowed for '{}' in '{}'",
                            option.code, key, schema.slug_path
                        ),
                    ));
                }

                let value = TypedValue::Lookup(ChosenOption {
                    id: option.id,
                    code: option.code.clone(),
                });
                (value, option.label.clone())
            }
            (_, [Supplied::Scalar(text)]) if expected == Some(ValueSlot::Scalar) => {
                let parsed = registry::parse_scalar(definition.tag(), text).ok_or_else(|| {
                    fail(
                        AssignmentErrorKind::MalformedAssignment,
                        format!("'{}' is not a valid {} value", text, definition.tag()),
                    )
                })?;
                let value = self.check_scalar(schema, definition, parsed).map_err(|message| {
                    let kind = match definition.kind {
                        AttributeKind::String { .. } => AssignmentErrorKind::PatternMismatch,
                        _ => AssignmentErrorKind::ValueOutOfRange,
                    };
                    fail(kind, message)
                })?;
                let label = match definition.unit() {
                    Some(unit) => format!("{} {}", value.canonical(), unit),
                    None => value.canonical(),
                };
                (value, label)
            }
            (_, [other]) => {
                let expected = expected.map_or_else(|| "no value".to_string(), |s| s.to_string());
                return Err(fail(
                    AssignmentErrorKind::MalformedAssignment,
                    format!("'{}' expects a {}, not a {}", key, expected, other.slot()),
                ));
            }
        };

        let group = schema.group_of(definition.id).map(|g| GroupRef {
            id: g.id,
            key: g.key.clone(),
            label: g.label.clone(),
            position: g.position,
        });

        Ok(ValidatedAssignment {
            attribute_id: definition.id,
            attribute_key: definition.key.clone(),
            attribute_label: definition.label.clone(),
            position: definition.position,
            value,
            value_label,
            group,
        })
    }

    /// Bounds and pattern checks; Decimal values come back at the fixed scale
    fn check_scalar(
        &self,
        schema: &EffectiveSchema,
        definition: &AttributeDefinition,
        value: TypedValue,
    ) -> Result<TypedValue, String> {
        let out_of_range = |bounds: &NumericBounds| {
            format!("'{}' must be {}", definition.key, bounds.describe())
        };

        match (&definition.kind, value) {
            (AttributeKind::Int { bounds, .. }, TypedValue::Int(v)) => {
                if bounds.contains(&Decimal::from(v)) {
                    Ok(TypedValue::Int(v))
                } else {
                    Err(out_of_range(bounds))
                }
            }
            (AttributeKind::Decimal { bounds, .. }, TypedValue::Decimal(v)) => {
                // Bounds apply to the stored value, after rounding to the fixed scale
                let normalized = self.normalize_decimal(v);
                if bounds.contains(&normalized) {
                    Ok(TypedValue::Decimal(normalized))
                } else {
                    Err(out_of_range(bounds))
                }
            }
            (
                AttributeKind::String {
                    pattern: Some(pattern),
                },
                TypedValue::String(text),
            ) => match schema.pattern(definition.id) {
                Some(regex) if regex.is_match(&text) => Ok(TypedValue::String(text)),
                _ => Err(format!(
                    "'{}' must match the pattern '{}'",
                    definition.key, pattern
                )),
            },
            (_, value) => Ok(value),
        }
    }

    fn normalize_decimal(&self, value: Decimal) -> Decimal {
        let mut normalized =
            value.round_dp_with_strategy(self.decimal_scale, RoundingStrategy::MidpointAwayFromZero);
        normalized.rescale(self.decimal_scale);
        normalized
    }

    #[allow(clippy::too_many_arguments)]
    fn check_relations(
        &self,
        schema: &EffectiveSchema,
        pass: ValidationPass,
        definition: &AttributeDefinition,
        validated: &ValidatedAssignment,
        resolved: &HashMap<Uuid, ValidatedAssignment>,
        supplied: &HashSet<Uuid>,
        context: Option<&ValidatedAttributes>,
        errors: &mut Errors,
    ) {
        match &validated.value {
            TypedValue::Option(chosen_option) => {
                let Some(parent_id) = definition.depends_on() else {
                    return;
                };
                // Options without a parent option are valid under any parent value
                let Some(required) = schema
                    .option(chosen_option.id)
                    .and_then(|o| o.parent_option_id)
                else {
                    return;
                };

                let parent = schema.definition(parent_id);
                let parent_key = parent.map_or("unknown", |p| p.key.as_str());
                let required_code = schema.option(required).map_or("unknown", |o| o.code.as_str());
                let violation = |message: String| {
                    AssignmentValidationError::new(
                        &definition.key,
                        AssignmentErrorKind::DependencyViolation,
                        Some(chosen_option.code.clone()),
                        message,
                    )
                };

                match chosen_value(parent_id, resolved, context) {
                    Some(actual) if actual.chosen_id() == Some(required) => {}
                    Some(actual) => errors.push(violation(format!(
                        "'{}' requires '{}' to be '{}', but it is '{}'",
                        chosen_option.code,
                        parent_key,
                        required_code,
                        actual.canonical()
                    ))),
                    // The parent already failed its own checks
                    None if supplied.contains(&parent_id) => {}
                    // A parent from the other pass cannot be checked without context
                    None if context.is_none()
                        && parent.is_some_and(|p| schema.pass_of(p) != pass) => {}
                    None => errors.push(violation(format!(
                        "'{}' requires '{}' to be '{}'",
                        chosen_option.code, parent_key, required_code
                    ))),
                }
            }
            TypedValue::Lookup(child) => {
                let Some(child_type_id) = definition.lookup_type_id() else {
                    return;
                };
                for parent_type_id in self.lookups.parent_types_of(child_type_id) {
                    let parents = schema
                        .definitions()
                        .iter()
                        .filter(|d| d.lookup_type_id() == Some(*parent_type_id));
                    for parent in parents {
                        let Some(TypedValue::Lookup(parent_option)) =
                            chosen_value(parent.id, resolved, context)
                        else {
                            continue;
                        };
                        if !self.lookups.is_linked(parent_option.id, child.id) {
                            errors.push(AssignmentValidationError::new(
                                &definition.key,
                                AssignmentErrorKind::LookupLinkViolation,
                                Some(child.code.clone()),
                                format!(
                                    "'{}' is not available for '{}' '{}'",
                                    child.code, parent.key, parent_option.code
                                ),
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

fn definition_for<'s>(
    schema: &'s EffectiveSchema,
    pass: ValidationPass,
    assignment: &AttributeAssignment,
    errors: &mut Errors,
) -> Option<&'s AttributeDefinition> {
    match schema.definition(assignment.attribute_id) {
        Some(definition) if schema.pass_of(definition) == pass => Some(definition),
        Some(definition) => {
            errors.push(AssignmentValidationError::new(
                &definition.key,
                AssignmentErrorKind::UnknownAttribute,
                assignment.raw_value(),
                format!("'{}' is not a {} attribute", definition.key, pass),
            ));
            None
        }
        None => {
            errors.push(AssignmentValidationError::new(
                assignment.attribute_id.to_string(),
                AssignmentErrorKind::UnknownAttribute,
                assignment.raw_value(),
                format!(
                    "Attribute {} is not part of the '{}' schema",
                    assignment.attribute_id, schema.slug_path
                ),
            ));
            None
        }
    }
}

fn chosen_value<'v>(
    attribute_id: Uuid,
    resolved: &'v HashMap<Uuid, ValidatedAssignment>,
    context: Option<&'v ValidatedAttributes>,
) -> Option<&'v TypedValue> {
    resolved
        .get(&attribute_id)
        .or_else(|| context.and_then(|c| c.get(attribute_id)))
        .map(|a| &a.value)
}

/// Required definitions and group completeness for the pass.
///
/// Values that were supplied but rejected count as present, so they are
/// not reported a second time as missing.
fn check_coverage(
    schema: &EffectiveSchema,
    pass: ValidationPass,
    supplied: &HashSet<Uuid>,
    errors: &mut Errors,
) {
    for definition in schema.top_level(pass) {
        if let AttributeKind::Group { .. } = definition.kind {
            let members = schema.members(definition);
            let missing: Vec<&str> = members
                .iter()
                .filter(|m| !supplied.contains(&m.id))
                .map(|m| m.key.as_str())
                .collect();

            if missing.len() == members.len() {
                if definition.required {
                    errors.push(AssignmentValidationError::new(
                        &definition.key,
                        AssignmentErrorKind::MissingRequiredAttribute,
                        None,
                        format!("'{}' is required", definition.key),
                    ));
                }
            } else if !missing.is_empty() {
                errors.push(AssignmentValidationError::new(
                    &definition.key,
                    AssignmentErrorKind::IncompleteGroup,
                    None,
                    format!(
                        "'{}' is missing {}",
                        definition.key,
                        missing.join(", ")
                    ),
                ));
            }
        } else if definition.required && !supplied.contains(&definition.id) {
            errors.push(AssignmentValidationError::new(
                &definition.key,
                AssignmentErrorKind::MissingRequiredAttribute,
                None,
                format!("'{}' is required", definition.key),
            ));
        }
    }
}
