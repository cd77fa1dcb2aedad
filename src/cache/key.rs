//! Cache Key Derivation
//!
//! Keys are `namespace:sha256(canonical-json(payload))`. Identical request
//! payloads collide on the same slot, distinct payloads never collide
//! (hash collision treated as negligible). Object keys are sorted
//! recursively so field order in the payload does not change the key.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Deterministic, namespaced cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive a key from a namespace prefix and a request payload.
    pub fn derive(namespace: &str, payload: &Value) -> Self {
        let mut canonical = String::new();
        write_canonical(payload, &mut canonical);
        let digest = Sha256::digest(canonical.as_bytes());
        Self(format!("{}:{:x}", namespace, digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Serializing a plain string cannot fail.
                out.push_str(&serde_json::to_string(key).unwrap_or_default());
                out.push(':');
                if let Some(child) = map.get(key.as_str()) {
                    write_canonical(child, out);
                }
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}
