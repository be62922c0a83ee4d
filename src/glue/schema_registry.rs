//! Glue Schema Registry: `Registry`, `Schema`, `SchemaVersion`,
//! `SchemaVersionMetadata`.

use super::common::{check_enum, check_min, check_non_empty, GlueProperties, Tag};
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DATA_FORMATS: &[&str] = &["AVRO", "JSON", "PROTOBUF"];

pub const COMPATIBILITY_MODES: &[&str] = &[
    "NONE",
    "DISABLED",
    "BACKWARD",
    "BACKWARD_ALL",
    "FORWARD",
    "FORWARD_ALL",
    "FULL",
    "FULL_ALL",
];

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Registry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    pub name: Value<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Registry {
    pub fn new(name: impl Into<Value<String>>) -> Self {
        Self {
            description: None,
            name: name.into(),
            tags: Vec::new(),
        }
    }
}

impl GlueProperties for Registry {
    fn validate(&self, errors: &mut Vec<String>) {
        check_non_empty(errors, "Name", Some(&self.name));
    }
}

// ============================================================================
// Schema
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Schema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_version: Option<SchemaVersionRef>,

    pub compatibility: Value<String>,

    pub data_format: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    pub name: Value<String>,

    /// Omitted means the default registry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryRef>,

    pub schema_definition: Value<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Schema {
    pub fn new(
        name: impl Into<Value<String>>,
        data_format: impl Into<Value<String>>,
        compatibility: impl Into<Value<String>>,
        schema_definition: impl Into<Value<String>>,
    ) -> Self {
        Self {
            checkpoint_version: None,
            compatibility: compatibility.into(),
            data_format: data_format.into(),
            description: None,
            name: name.into(),
            registry: None,
            schema_definition: schema_definition.into(),
            tags: Vec::new(),
        }
    }
}

/// Either Arn or Name identifies the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RegistryRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SchemaVersionRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_latest: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_number: Option<Value<i64>>,
}

impl GlueProperties for Schema {
    fn validate(&self, errors: &mut Vec<String>) {
        check_enum(errors, "DataFormat", Some(&self.data_format), DATA_FORMATS);
        check_enum(
            errors,
            "Compatibility",
            Some(&self.compatibility),
            COMPATIBILITY_MODES,
        );
        check_non_empty(errors, "SchemaDefinition", Some(&self.schema_definition));
        if let Some(reg) = &self.registry {
            if reg.arn.is_some() == reg.name.is_some() {
                errors.push("Registry must set exactly one of Arn, Name".to_string());
            }
        }
        if let Some(cp) = &self.checkpoint_version {
            let latest = matches!(cp.is_latest, Some(Value::Literal(true)));
            if latest && cp.version_number.is_some() {
                errors.push(
                    "CheckpointVersion: IsLatest and VersionNumber are mutually exclusive"
                        .to_string(),
                );
            }
            check_min(errors, "CheckpointVersion.VersionNumber", cp.version_number.as_ref(), 1);
        }
    }
}

// ============================================================================
// SchemaVersion
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SchemaVersion {
    pub schema: SchemaIdentifier,

    pub schema_definition: Value<String>,
}

/// SchemaArn, or SchemaName together with RegistryName.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SchemaIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_arn: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<Value<String>>,
}

impl GlueProperties for SchemaVersion {
    fn validate(&self, errors: &mut Vec<String>) {
        let s = &self.schema;
        let by_arn = s.schema_arn.is_some();
        let by_name = s.schema_name.is_some() && s.registry_name.is_some();
        if by_arn == by_name {
            errors.push(
                "Schema must set SchemaArn, or SchemaName with RegistryName (not both)".to_string(),
            );
        }
        check_non_empty(errors, "SchemaDefinition", Some(&self.schema_definition));
    }
}

// ============================================================================
// SchemaVersionMetadata
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SchemaVersionMetadata {
    pub key: Value<String>,

    pub schema_version_id: Value<String>,

    pub value: Value<String>,
}

impl GlueProperties for SchemaVersionMetadata {
    fn validate(&self, errors: &mut Vec<String>) {
        check_non_empty(errors, "Key", Some(&self.key));
        check_non_empty(errors, "Value", Some(&self.value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cg018_registry_tags_are_a_list() {
        let mut r = Registry::new("events");
        r.tags = vec![Tag::new("team", "data")];
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v, json!({"Name": "events", "Tags": [{"Key": "team", "Value": "data"}]}));
    }

    #[test]
    fn test_cg018_schema_render_and_validate() {
        let mut s = Schema::new("order", "AVRO", "BACKWARD", r#"{"type":"record"}"#);
        s.registry = Some(RegistryRef {
            arn: Some(Value::get_att("Registry", "Arn")),
            name: None,
        });
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["Registry"], json!({"Arn": {"Fn::GetAtt": ["Registry", "Arn"]}}));
        let mut errors = Vec::new();
        s.validate(&mut errors);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_cg018_schema_bad_enums() {
        let mut s = Schema::new("order", "XML", "SOMETIMES", "{}");
        s.registry = Some(RegistryRef::default());
        s.checkpoint_version = Some(SchemaVersionRef {
            is_latest: Some(true.into()),
            version_number: Some(Value::Literal(0)),
        });
        let mut errors = Vec::new();
        s.validate(&mut errors);
        assert_eq!(errors.len(), 5, "{:?}", errors);
    }

    #[test]
    fn test_cg018_schema_version_identifier() {
        let ok = SchemaVersion {
            schema: SchemaIdentifier {
                schema_arn: Some(Value::reference("Schema")),
                ..Default::default()
            },
            schema_definition: "{}".into(),
        };
        let mut errors = Vec::new();
        ok.validate(&mut errors);
        assert!(errors.is_empty());

        let name_only = SchemaVersion {
            schema: SchemaIdentifier {
                schema_name: Some("order".into()),
                ..Default::default()
            },
            schema_definition: "{}".into(),
        };
        let mut errors = Vec::new();
        name_only.validate(&mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_cg018_metadata_requires_all_fields() {
        let err = serde_json::from_value::<SchemaVersionMetadata>(json!({"Key": "k", "Value": "v"}))
            .unwrap_err();
        assert!(err.to_string().contains("SchemaVersionId"));
    }
}
