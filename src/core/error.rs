use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::types::ApiResponse;

/// Failures while resolving the effective schema of a category.
///
/// These indicate a data-integrity problem upstream and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaResolutionError {
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    #[error("Cyclic category hierarchy detected at {0}")]
    CyclicHierarchy(Uuid),
}

/// Rule violated by a proposed attribute assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentErrorKind {
    UnknownAttribute,
    MalformedAssignment,
    MissingRequiredAttribute,
    IncompleteGroup,
    ValueOutOfRange,
    PatternMismatch,
    UnknownOption,
    DependencyViolation,
    NotInAllowList,
    LookupLinkViolation,
    DuplicateAttribute,
    DuplicateVariantKey,
}

impl std::fmt::Display for AssignmentErrorKind {
    /// The snake_case name the kind serializes to
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::String(name)) => f.write_str(&name),
            _ => write!(f, "{:?}", self),
        }
    }
}

/// A single user-correctable problem with a set of assignments.
///
/// Shaped so the HTTP layer can turn it into a field-level error directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentValidationError {
    /// Definition key, or the raw attribute id when the definition is unknown
    pub attribute_key: String,
    pub kind: AssignmentErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
    /// Index of the variant within the submission, `None` for listing-level errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_index: Option<usize>,
}

impl AssignmentValidationError {
    pub fn new(
        attribute_key: impl Into<String>,
        kind: AssignmentErrorKind,
        value: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            attribute_key: attribute_key.into(),
            kind,
            value,
            message: message.into(),
            variant_index: None,
        }
    }

    pub fn for_variant(mut self, index: usize) -> Self {
        self.variant_index = Some(index);
        self
    }
}

impl std::fmt::Display for AssignmentValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.attribute_key, self.kind, self.message)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Schema resolution error: {0}")]
    SchemaResolution(#[from] SchemaResolutionError),

    #[error("Validation failed with {} error(s)", .0.len())]
    Validation(Vec<AssignmentValidationError>),

    #[error("Stale schema: {0}")]
    StaleSchema(String),

    #[error("Category not listable: {0}")]
    NotListable(String),

    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the caller should re-resolve the schema and try again
    pub fn is_stale(&self) -> bool {
        matches!(self, AppError::StaleSchema(_))
    }

    /// Convert into the shared response envelope
    pub fn to_response(&self) -> ApiResponse<()> {
        match self {
            AppError::Validation(errors) => {
                ApiResponse::<()>::error(Some(self.to_string()), Some(errors.clone()))
            }
            AppError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                ApiResponse::<()>::error(Some("Catalog store unavailable".to_string()), None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ApiResponse::<()>::error(Some("Internal error".to_string()), None)
            }
            other => ApiResponse::<()>::error(Some(other.to_string()), None),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_response_carries_field_errors() {
        let err = AppError::Validation(vec![AssignmentValidationError::new(
            "weight",
            AssignmentErrorKind::ValueOutOfRange,
            Some("10001".to_string()),
            "value must be at most 10000",
        )]);

        let response = err.to_response();
        assert!(!response.success);
        let errors = response.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, AssignmentErrorKind::ValueOutOfRange);
        assert_eq!(
            response.message.as_deref(),
            Some("Validation failed with 1 error(s)")
        );
    }

    #[test]
    fn test_internal_errors_are_not_leaked() {
        let response = AppError::Internal("lock poisoned".to_string()).to_response();
        assert_eq!(response.message.as_deref(), Some("Internal error"));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let value = serde_json::to_value(AssignmentErrorKind::NotInAllowList).unwrap();
        assert_eq!(value, serde_json::json!("not_in_allow_list"));
        assert_eq!(AssignmentErrorKind::NotInAllowList.to_string(), "not_in_allow_list");
    }

    #[test]
    fn test_kind_display_matches_wire_name() {
        let kinds = [
            AssignmentErrorKind::UnknownAttribute,
            AssignmentErrorKind::MalformedAssignment,
            AssignmentErrorKind::MissingRequiredAttribute,
            AssignmentErrorKind::IncompleteGroup,
            AssignmentErrorKind::ValueOutOfRange,
            AssignmentErrorKind::PatternMismatch,
            AssignmentErrorKind::UnknownOption,
            AssignmentErrorKind::DependencyViolation,
            AssignmentErrorKind::NotInAllowList,
            AssignmentErrorKind::LookupLinkViolation,
            AssignmentErrorKind::DuplicateAttribute,
            AssignmentErrorKind::DuplicateVariantKey,
        ];
        for kind in kinds {
            assert_eq!(serde_json::to_value(kind).unwrap(), serde_json::json!(kind.to_string()));
        }
        assert_eq!(
            AssignmentErrorKind::MissingRequiredAttribute.to_string(),
            "missing_required_attribute"
        );
    }
}
