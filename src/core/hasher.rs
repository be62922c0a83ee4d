//! CG-005: BLAKE3 content hashing for templates, entries, and property values.
//!
//! Maps keep template order for rendering, so hashing goes through a
//! key-sorted canonical form: the same properties hash equally whatever
//! order they were written in.

use super::types::ResourceEntry;

/// Hash a string. Returns `"blake3:{hex}"`.
pub fn hash_string(s: &str) -> String {
    format!("blake3:{}", blake3::hash(s.as_bytes()).to_hex())
}

/// Compact JSON with object keys sorted at every depth.
pub fn canonical_json(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::Value::String((*key).clone()).to_string());
                out.push(':');
                if let Some(v) = map.get(key.as_str()) {
                    write_canonical(v, out);
                }
            }
            out.push('}');
        }
        serde_json::Value::Array(items) => {
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

/// Hash of a JSON value's canonical form.
pub fn hash_value(value: &serde_json::Value) -> String {
    hash_string(&canonical_json(value))
}

/// Hash of what CloudFormation deploys for an entry: type, properties,
/// explicit dependencies, condition, and deletion/replace policies.
/// `Metadata` is excluded; changing it alone does not update the resource.
pub fn hash_entry(entry: &ResourceEntry) -> String {
    let properties = entry
        .properties
        .as_ref()
        .map(hash_value)
        .unwrap_or_else(|| hash_string(""));
    let mut deps = entry.depends_on.to_vec();
    deps.sort();
    let deps = deps.join(",");
    let condition = entry.condition.as_deref().unwrap_or_default();
    let deletion = entry
        .deletion_policy
        .map(|p| p.to_string())
        .unwrap_or_default();
    let replace = entry
        .update_replace_policy
        .map(|p| p.to_string())
        .unwrap_or_default();
    composite_hash(&[
        &entry.resource_type,
        &properties,
        &deps,
        condition,
        &deletion,
        &replace,
    ])
}

/// Compute a composite hash from multiple component hashes.
pub fn composite_hash(components: &[&str]) -> String {
    let mut hasher = blake3::Hasher::new();
    for c in components {
        hasher.update(c.as_bytes());
        hasher.update(b"\0");
    }
    format!("blake3:{}", hasher.finalize().to_hex())
}
