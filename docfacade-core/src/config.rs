//! Facade configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocumentStoreError, DocumentStoreResult};

const DEFAULT_DELETE_CONCURRENCY: usize = 16;

/// Tunables for [`DocumentStore`](crate::store::DocumentStore).
///
/// ```ignore
/// let config = StoreConfig::from_json_str(r#"{ "delete_concurrency": 4 }"#)?;
/// let store = DocumentStore::with_config(backend, config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of deletes in flight during `delete_collection`. Zero is treated as one.
    pub delete_concurrency: usize,
}

impl StoreConfig {
    /// Parses a JSON object. Missing keys take their defaults; any other JSON value is rejected.
    pub fn from_json_str(input: &str) -> DocumentStoreResult<Self> {
        let invalid = |err: serde_json::Error| {
            DocumentStoreError::invalid_argument(None, format!("Invalid store configuration: {err}"))
        };

        match serde_json::from_str::<Value>(input).map_err(invalid)? {
            value @ Value::Object(_) => serde_json::from_value(value).map_err(invalid),
            other => Err(DocumentStoreError::invalid_argument(
                None,
                format!("Invalid store configuration: expected a JSON object, got {other}"),
            )),
        }
    }

    pub fn with_delete_concurrency(mut self, delete_concurrency: usize) -> Self {
        self.delete_concurrency = delete_concurrency;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { delete_concurrency: DEFAULT_DELETE_CONCURRENCY }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json() {
        let config = StoreConfig::from_json_str(r#"{ "delete_concurrency": 4 }"#).unwrap();
        assert_eq!(config.delete_concurrency, 4);

        let config = StoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());

        assert!(StoreConfig::from_json_str(r#"{ "delete_concurrency": -1 }"#).is_err());
        assert!(StoreConfig::from_json_str("{").is_err());
    }

    #[test]
    fn test_config_rejects_non_objects() {
        for input in ["[]", "[4]", "null", "16", r#""fast""#] {
            let err = StoreConfig::from_json_str(input).unwrap_err();
            assert_eq!(err.code, "invalid-argument", "{input}");
        }
    }
}
