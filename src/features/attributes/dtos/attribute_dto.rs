use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::attributes::models::{AttributeDefinition, AttributeKind};

/// Request DTO for declaring an attribute on a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAttributeDefinitionDto {
    #[validate(
        length(min = 1, max = 64, message = "Key must be 1-64 characters"),
        regex(
            path = "*crate::shared::validation::KEY_REGEX",
            message = "Key must be snake_case, starting with a letter"
        )
    )]
    pub key: String,

    #[validate(length(min = 1, max = 128, message = "Label must be 1-128 characters"))]
    pub label: String,

    #[validate(range(min = 0, message = "Position must not be negative"))]
    #[serde(default)]
    pub position: i32,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub variant: bool,

    #[serde(flatten)]
    pub kind: AttributeKind,
}

impl CreateAttributeDefinitionDto {
    /// Validate the request and mint a definition owned by `category_id`
    pub fn into_definition(self, category_id: Uuid) -> Result<AttributeDefinition> {
        self.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let id = Uuid::now_v7();
        let mut kind = self.kind;
        if let AttributeKind::Enum { options, .. } = &mut kind {
            for option in options.iter_mut() {
                option.attribute_id = id;
            }
        }

        Ok(AttributeDefinition {
            id,
            category_id,
            key: self.key,
            label: self.label,
            position: self.position,
            required: self.required,
            variant: self.variant,
            kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;

    #[test]
    fn test_into_definition_assigns_ids() {
        let label: String = Sentence(1..4).fake();
        let dto: CreateAttributeDefinitionDto = serde_json::from_value(serde_json::json!({
            "key": "color",
            "label": label,
            "position": 2,
            "variant": true,
            "kind": "enum",
            "options": [
                {
                    "id": "7b0b7b52-3f4f-4b43-9c0f-0d5a2a0f6a11",
                    "attribute_id": "00000000-0000-0000-0000-000000000000",
                    "code": "red",
                    "label": "Red",
                    "position": 0
                }
            ]
        }))
        .unwrap();

        let category_id = Uuid::new_v4();
        let definition = dto.into_definition(category_id).unwrap();

        assert_eq!(definition.category_id, category_id);
        assert!(definition.variant);
        assert_eq!(definition.options()[0].attribute_id, definition.id);
    }

    #[test]
    fn test_bad_key_is_rejected() {
        let dto = CreateAttributeDefinitionDto {
            key: "Screen Size".to_string(),
            label: "Screen size".to_string(),
            position: 0,
            required: false,
            variant: false,
            kind: AttributeKind::Bool,
        };

        let result = dto.into_definition(Uuid::new_v4());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
