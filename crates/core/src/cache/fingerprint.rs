//! Content fingerprints used as validator tokens.
//!
//! The digest is taken over a canonical form of the value: object keys in
//! byte order, no whitespace, scalars in compact JSON. Two values that differ
//! only in key order therefore share a fingerprint.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::Error;

/// Fingerprint any serializable value.
///
/// Fails only when the value cannot be represented as a JSON tree
/// (e.g. a map with non-string keys).
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    let tree = serde_json::to_value(value).map_err(|e| Error::Fingerprint(e.to_string()))?;
    Ok(fingerprint_value(&tree))
}

/// Fingerprint a JSON tree.
pub fn fingerprint_value(value: &Value) -> String {
    let mut hasher = Sha256::new();
    feed(&mut hasher, value);
    hex::encode(hasher.finalize())
}

fn feed(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

            hasher.update(b"{");
            for (i, (key, child)) in entries.into_iter().enumerate() {
                if i > 0 {
                    hasher.update(b",");
                }
                feed_string(hasher, key);
                hasher.update(b":");
                feed(hasher, child);
            }
            hasher.update(b"}");
        }
        Value::Array(items) => {
            hasher.update(b"[");
            for (i, child) in items.iter().enumerate() {
                if i > 0 {
                    hasher.update(b",");
                }
                feed(hasher, child);
            }
            hasher.update(b"]");
        }
        Value::String(s) => feed_string(hasher, s),
        scalar => hasher.update(scalar.to_string().as_bytes()),
    }
}

// Strings go through serde_json's escaper so `"a\"b"` and `a"b` never collide.
fn feed_string(hasher: &mut Sha256, s: &str) {
    hasher.update(Value::from(s).to_string().as_bytes());
}
