use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Canonical, order-independent identity of a variant within its listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantKey(String);

impl VariantKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex-encoded SHA-256 of the key, suitable as a fixed-width index column
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.0.as_bytes()))
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One resolved value inside an axis snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisValue {
    pub attribute_id: Uuid,
    pub key: String,
    pub label: String,
    /// Canonical value as it appears in the variant key
    pub value: String,
    /// Human-readable label of the chosen option, or the canonical value
    pub value_label: String,
}

/// A variant axis as it looked when the variant was accepted.
///
/// Plain axes carry a single value; group axes carry one value per member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSnapshot {
    pub attribute_id: Uuid,
    pub key: String,
    pub label: String,
    pub values: Vec<AxisValue>,
}

/// Labels and values of every axis frozen at commit time, so later schema
/// edits do not change what a stored variant displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub captured_at: DateTime<Utc>,
    pub category_version: i64,
    pub axes: Vec<AxisSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_hex() {
        let key = VariantKey::new("color:red|storage_gb:128");
        let digest = key.digest();

        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, VariantKey::new("color:red|storage_gb:128").digest());
        assert_ne!(digest, VariantKey::new("color:blue|storage_gb:128").digest());
    }

    #[test]
    fn test_key_serializes_as_plain_string() {
        let key = VariantKey::new("size:m");
        assert_eq!(serde_json::to_value(&key).unwrap(), serde_json::json!("size:m"));
    }
}
