//! # Source Descriptor
//!
//! The serializable snapshot of a source's configuration. Pipeline
//! definitions persist descriptors as flat JSON objects and hand them back
//! to [`crate::registry::ScopeRegistry::resolve`] to reconstruct the source.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Default rows per batch when the caller does not override it
pub const DEFAULT_BATCH_SIZE: i64 = 100;

/// Immutable snapshot of a source's configuration.
///
/// Serialized with exactly the keys `model_class`, `scope_name`,
/// `scope_params`, and `batch_size`; consumers on the pipeline side depend
/// on that flat shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub model_class: String,
    pub scope_name: String,
    pub scope_params: Vec<Value>,
    pub batch_size: i64,
}

impl SourceDescriptor {
    /// Serialize to a flat JSON object
    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Deserialize from the flat JSON object form
    pub fn from_json(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor() -> SourceDescriptor {
        SourceDescriptor {
            model_class: "Product".to_string(),
            scope_name: "priced_above".to_string(),
            scope_params: vec![json!(1500)],
            batch_size: 25,
        }
    }

    #[test]
    fn serializes_with_exactly_the_contract_keys() {
        let value = descriptor().to_json().unwrap();
        let object = value.as_object().unwrap();

        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["batch_size", "model_class", "scope_name", "scope_params"]
        );
        assert_eq!(object["model_class"], json!("Product"));
        assert_eq!(object["scope_params"], json!([1500]));
    }

    #[test]
    fn json_round_trip_preserves_the_descriptor() {
        let original = descriptor();
        let restored = SourceDescriptor::from_json(original.to_json().unwrap()).unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn rejects_json_missing_a_key() {
        let value = json!({
            "model_class": "Product",
            "scope_name": "active",
            "batch_size": 100
        });
        assert!(SourceDescriptor::from_json(value).is_err());
    }
}
