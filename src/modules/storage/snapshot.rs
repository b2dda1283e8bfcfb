use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, Result};
use crate::features::categories::models::CategoryNode;
use crate::features::lookups::models::{LookupLink, LookupOption, LookupType};

/// Serialized catalog: the category forest plus lookup dictionaries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub categories: Vec<CategoryNode>,
    #[serde(default)]
    pub lookup_types: Vec<LookupType>,
    #[serde(default)]
    pub lookup_options: Vec<LookupOption>,
    #[serde(default)]
    pub lookup_links: Vec<LookupLink>,
}

impl CatalogSnapshot {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            tracing::error!("Failed to read catalog snapshot {}: {:?}", path.display(), e);
            AppError::Store(format!(
                "Failed to read catalog snapshot {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::InvalidSchema(format!("Malformed catalog snapshot: {}", e)))
    }
}
