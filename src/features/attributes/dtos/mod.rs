mod attribute_dto;

pub use attribute_dto::CreateAttributeDefinitionDto;
