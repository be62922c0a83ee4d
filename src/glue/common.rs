//! Shared property types and validation helpers for the Glue bindings.

use crate::core::types::Value;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Glue `Tags` declared as CloudFormation `Json`: tag name to value.
pub type TagMap = IndexMap<String, Value<String>>;

/// A `{Key, Value}` tag, used by the schema-registry and usage-profile types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Tag {
    pub key: Value<String>,
    pub value: Value<String>,
}

impl Tag {
    pub fn new(key: impl Into<Value<String>>, value: impl Into<Value<String>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The properties object of one `AWS::Glue::*` resource type.
///
/// The type system carries required/optional members and primitive types;
/// `validate` adds the constraints it cannot express (enumerated strings,
/// mutually exclusive members). Intrinsic values are never checked.
pub trait GlueProperties: Serialize + DeserializeOwned {
    fn validate(&self, _errors: &mut Vec<String>) {}
}

/// Push an error when a literal string is outside `allowed`.
pub(crate) fn check_enum(
    errors: &mut Vec<String>,
    field: &str,
    value: Option<&Value<String>>,
    allowed: &[&str],
) {
    if let Some(Value::Literal(v)) = value {
        if !allowed.contains(&v.as_str()) {
            errors.push(format!(
                "{} must be one of {}, got \"{}\"",
                field,
                allowed.join("|"),
                v
            ));
        }
    }
}

/// Push an error when a literal number is outside `[min, max]`.
pub(crate) fn check_range(
    errors: &mut Vec<String>,
    field: &str,
    value: Option<&Value<f64>>,
    min: f64,
    max: f64,
) {
    if let Some(Value::Literal(v)) = value {
        if !(min..=max).contains(v) {
            errors.push(format!("{} must be between {} and {}, got {}", field, min, max, v));
        }
    }
}

/// Push an error when a literal integer is below `min`.
pub(crate) fn check_min(errors: &mut Vec<String>, field: &str, value: Option<&Value<i64>>, min: i64) {
    if let Some(Value::Literal(v)) = value {
        if *v < min {
            errors.push(format!("{} must be at least {}, got {}", field, min, v));
        }
    }
}

/// Push an error when a literal string is empty.
pub(crate) fn check_non_empty(errors: &mut Vec<String>, field: &str, value: Option<&Value<String>>) {
    if let Some(Value::Literal(v)) = value {
        if v.is_empty() {
            errors.push(format!("{} must not be empty", field));
        }
    }
}

/// The literal string, if set and not an intrinsic.
pub(crate) fn literal_str(value: Option<&Value<String>>) -> Option<&str> {
    value.and_then(Value::literal).map(String::as_str)
}
