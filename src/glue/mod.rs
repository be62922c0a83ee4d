//! CG-010: Typed bindings for the `AWS::Glue::*` resource types.
//!
//! Each resource type is one plain struct whose serde shape is exactly the
//! CloudFormation `Properties` object. [`GlueResource`] wraps them so the
//! rest of the crate can render, parse and validate any Glue type by kind.

pub mod catalog;
pub mod classifier;
pub mod common;
pub mod connection;
pub mod crawler;
pub mod data_quality;
pub mod job;
pub mod ml_transform;
pub mod schema_registry;
pub mod security;
pub mod table;
pub mod trigger;
pub mod usage_profile;

pub use catalog::{DataCatalogEncryptionSettings, Database};
pub use classifier::Classifier;
pub use common::{GlueProperties, Tag, TagMap};
pub use connection::Connection;
pub use crawler::Crawler;
pub use data_quality::{CustomEntityType, DataQualityRuleset};
pub use job::{DevEndpoint, Job};
pub use ml_transform::MlTransform;
pub use schema_registry::{Registry, Schema, SchemaVersion, SchemaVersionMetadata};
pub use security::SecurityConfiguration;
pub use table::{Partition, Table, TableOptimizer};
pub use trigger::{Trigger, Workflow};
pub use usage_profile::UsageProfile;

use crate::core::error::{CfnError, Result};
use crate::core::types::ResourceEntry;
use std::fmt;

macro_rules! glue_resources {
    ($($variant:ident($ty:ty) => $type_name:literal),+ $(,)?) => {
        /// One supported `AWS::Glue::*` resource type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ResourceKind {
            $($variant),+
        }

        impl ResourceKind {
            pub const ALL: &'static [ResourceKind] = &[$(ResourceKind::$variant),+];

            /// CloudFormation type name, e.g. `AWS::Glue::Job`.
            pub fn type_name(self) -> &'static str {
                match self {
                    $(ResourceKind::$variant => $type_name),+
                }
            }

            pub fn from_type_name(name: &str) -> Option<Self> {
                match name {
                    $($type_name => Some(ResourceKind::$variant),)+
                    _ => None,
                }
            }

            /// JSON Schema of the `Properties` object.
            pub fn json_schema(self) -> schemars::schema::RootSchema {
                match self {
                    $(ResourceKind::$variant => schemars::schema_for!($ty)),+
                }
            }
        }

        /// A typed Glue resource of any supported kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum GlueResource {
            $($variant($ty)),+
        }

        impl GlueResource {
            pub fn kind(&self) -> ResourceKind {
                match self {
                    $(GlueResource::$variant(_) => ResourceKind::$variant),+
                }
            }

            /// The CloudFormation `Properties` object.
            pub fn render_properties(&self) -> Result<serde_json::Value> {
                let rendered = match self {
                    $(GlueResource::$variant(p) => serde_json::to_value(p)),+
                };
                rendered.map_err(|e| {
                    CfnError::Render(format!("{}: {}", self.kind().type_name(), e))
                })
            }

            /// Parse a `Properties` object as `kind`. Errors name the
            /// offending property path, e.g. `Command.Name`.
            pub fn from_properties(kind: ResourceKind, properties: &serde_json::Value) -> Result<Self> {
                let parsed = match kind {
                    $(ResourceKind::$variant => {
                        serde_path_to_error::deserialize::<_, $ty>(properties.clone())
                            .map(GlueResource::$variant)
                    }),+
                };
                parsed.map_err(|err| {
                    let path = err.path().to_string();
                    let inner = err.into_inner();
                    if path.is_empty() || path == "." {
                        CfnError::Parse(format!("{}: {}", kind.type_name(), inner))
                    } else {
                        CfnError::Parse(format!("{}: {}: {}", kind.type_name(), path, inner))
                    }
                })
            }

            /// Constraints the type system cannot express; empty when valid.
            pub fn validate(&self) -> Vec<String> {
                let mut errors = Vec::new();
                match self {
                    $(GlueResource::$variant(p) => p.validate(&mut errors)),+
                }
                errors
            }
        }

        $(
            impl From<$ty> for GlueResource {
                fn from(properties: $ty) -> Self {
                    GlueResource::$variant(properties)
                }
            }
        )+
    };
}

glue_resources! {
    Classifier(Classifier) => "AWS::Glue::Classifier",
    Connection(Connection) => "AWS::Glue::Connection",
    Crawler(Crawler) => "AWS::Glue::Crawler",
    CustomEntityType(CustomEntityType) => "AWS::Glue::CustomEntityType",
    DataCatalogEncryptionSettings(DataCatalogEncryptionSettings) => "AWS::Glue::DataCatalogEncryptionSettings",
    DataQualityRuleset(DataQualityRuleset) => "AWS::Glue::DataQualityRuleset",
    Database(Database) => "AWS::Glue::Database",
    DevEndpoint(DevEndpoint) => "AWS::Glue::DevEndpoint",
    Job(Job) => "AWS::Glue::Job",
    MlTransform(MlTransform) => "AWS::Glue::MLTransform",
    Partition(Partition) => "AWS::Glue::Partition",
    Registry(Registry) => "AWS::Glue::Registry",
    Schema(Schema) => "AWS::Glue::Schema",
    SchemaVersion(SchemaVersion) => "AWS::Glue::SchemaVersion",
    SchemaVersionMetadata(SchemaVersionMetadata) => "AWS::Glue::SchemaVersionMetadata",
    SecurityConfiguration(SecurityConfiguration) => "AWS::Glue::SecurityConfiguration",
    Table(Table) => "AWS::Glue::Table",
    TableOptimizer(TableOptimizer) => "AWS::Glue::TableOptimizer",
    Trigger(Trigger) => "AWS::Glue::Trigger",
    UsageProfile(UsageProfile) => "AWS::Glue::UsageProfile",
    Workflow(Workflow) => "AWS::Glue::Workflow",
}

impl ResourceKind {
    /// Attributes readable through `Fn::GetAtt`.
    pub fn attributes(self) -> &'static [&'static str] {
        match self {
            ResourceKind::CustomEntityType
            | ResourceKind::DataCatalogEncryptionSettings
            | ResourceKind::DataQualityRuleset => &["Id"],
            ResourceKind::Registry => &["Arn"],
            ResourceKind::Schema => &["Arn", "InitialSchemaVersionId"],
            ResourceKind::SchemaVersion => &["VersionId"],
            ResourceKind::UsageProfile => &["CreatedOn"],
            _ => &[],
        }
    }

    /// Top-level properties whose change replaces the physical resource.
    pub fn replacement_properties(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Classifier => &[],
            ResourceKind::Connection => &["CatalogId"],
            ResourceKind::Crawler => &["Name"],
            ResourceKind::CustomEntityType => &["Name"],
            ResourceKind::DataCatalogEncryptionSettings => &["CatalogId"],
            ResourceKind::DataQualityRuleset => &["Name"],
            ResourceKind::Database => &["CatalogId", "DatabaseName"],
            ResourceKind::DevEndpoint => &["EndpointName"],
            ResourceKind::Job => &["Name"],
            ResourceKind::MlTransform => &[],
            ResourceKind::Partition => &["CatalogId", "DatabaseName", "TableName"],
            ResourceKind::Registry => &["Name"],
            ResourceKind::Schema => &["DataFormat", "Name", "Registry", "SchemaDefinition"],
            ResourceKind::SchemaVersion => &["Schema", "SchemaDefinition"],
            ResourceKind::SchemaVersionMetadata => &["Key", "SchemaVersionId", "Value"],
            ResourceKind::SecurityConfiguration => &["EncryptionConfiguration", "Name"],
            ResourceKind::Table => &["CatalogId", "DatabaseName"],
            ResourceKind::TableOptimizer => &["CatalogId", "DatabaseName", "TableName", "Type"],
            ResourceKind::Trigger => &["Name", "WorkflowName"],
            ResourceKind::UsageProfile => &["Name"],
            ResourceKind::Workflow => &["Name"],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

impl GlueResource {
    /// Typed view of a template entry. Non-Glue types yield `None`;
    /// unmodelled `AWS::Glue::*` types are an error.
    pub fn from_entry(entry: &ResourceEntry) -> Result<Option<Self>> {
        if !entry.is_glue() {
            return Ok(None);
        }
        let kind = ResourceKind::from_type_name(&entry.resource_type)
            .ok_or_else(|| CfnError::UnsupportedType(entry.resource_type.clone()))?;
        let empty = serde_json::Value::Object(serde_json::Map::new());
        let properties = entry.properties.as_ref().unwrap_or(&empty);
        Self::from_properties(kind, properties).map(Some)
    }

    /// `{Type, Properties}` entry with no dependencies or policies.
    pub fn to_entry(&self) -> Result<ResourceEntry> {
        Ok(ResourceEntry::new(
            self.kind().type_name(),
            self.render_properties()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Value;
    use serde_json::json;

    #[test]
    fn test_cg010_type_names_roundtrip() {
        assert_eq!(ResourceKind::ALL.len(), 21);
        for kind in ResourceKind::ALL {
            assert!(kind.type_name().starts_with("AWS::Glue::"));
            assert_eq!(ResourceKind::from_type_name(kind.type_name()), Some(*kind));
        }
        assert_eq!(ResourceKind::MlTransform.to_string(), "AWS::Glue::MLTransform");
        assert_eq!(ResourceKind::from_type_name("AWS::Glue::Nope"), None);
    }

    #[test]
    fn test_cg010_attributes() {
        assert_eq!(
            ResourceKind::Schema.attributes(),
            &["Arn", "InitialSchemaVersionId"]
        );
        assert!(ResourceKind::Job.attributes().is_empty());
    }

    #[test]
    fn test_cg010_entry_roundtrip() {
        let mut job = Job::new("arn:aws:iam::1:role/etl", job::JobCommand::etl("s3://b/s.py"));
        job.name = Some("nightly".into());
        let resource = GlueResource::from(job.clone());
        let entry = resource.to_entry().unwrap();
        assert_eq!(entry.resource_type, "AWS::Glue::Job");
        assert_eq!(entry.properties.as_ref().unwrap()["Name"], json!("nightly"));

        let back = GlueResource::from_entry(&entry).unwrap().unwrap();
        assert_eq!(back, GlueResource::Job(job));
    }

    #[test]
    fn test_cg010_from_entry_foreign_and_unknown() {
        let bucket = ResourceEntry::new("AWS::S3::Bucket", json!({}));
        assert!(GlueResource::from_entry(&bucket).unwrap().is_none());

        let unknown = ResourceEntry::new("AWS::Glue::Blueprint", json!({}));
        let err = GlueResource::from_entry(&unknown).unwrap_err();
        assert!(matches!(err, CfnError::UnsupportedType(_)));
    }

    #[test]
    fn test_cg010_missing_required_property() {
        let entry = ResourceEntry::new("AWS::Glue::Registry", json!({"Description": "x"}));
        let err = GlueResource::from_entry(&entry).unwrap_err();
        assert!(err.to_string().contains("AWS::Glue::Registry"));
        assert!(err.to_string().contains("Name"));
    }

    #[test]
    fn test_cg010_unknown_properties_rejected() {
        let entry = ResourceEntry::new(
            "AWS::Glue::Job",
            json!({
                "Role": "etl",
                "Command": {"Name": "glueetl"},
                "WorkerTyp": "G.1X",
                "NumberOfWorkerz": 2
            }),
        );
        let err = GlueResource::from_entry(&entry).unwrap_err().to_string();
        assert!(err.contains("AWS::Glue::Job: WorkerTyp: "), "{err}");
        assert!(err.contains("unknown field `WorkerTyp`"), "{err}");

        let nested = ResourceEntry::new(
            "AWS::Glue::Job",
            json!({"Role": "etl", "Command": {"Name": "glueetl", "Scriptlocation": "s3://b/s.py"}}),
        );
        let err = GlueResource::from_entry(&nested).unwrap_err().to_string();
        assert!(err.contains("Command.Scriptlocation"), "{err}");
        assert!(err.contains("unknown field `Scriptlocation`"), "{err}");
    }

    #[test]
    fn test_cg010_error_names_property_path() {
        let entry = ResourceEntry::new(
            "AWS::Glue::Job",
            json!({"Role": "etl", "Command": {"Name": "glueetl"}, "Description": {"Fn::Bogus": 1}}),
        );
        let err = GlueResource::from_entry(&entry).unwrap_err().to_string();
        assert!(err.contains("AWS::Glue::Job: Description: "), "{err}");

        let entry = ResourceEntry::new(
            "AWS::Glue::Crawler",
            json!({"Role": "r", "Targets": {"S3Targets": [{"Path": "s3://b/"}, {"SampleSize": "many"}]}}),
        );
        let err = GlueResource::from_entry(&entry).unwrap_err().to_string();
        assert!(err.contains("Targets.S3Targets[1].SampleSize"), "{err}");
    }

    #[test]
    fn test_cg010_absent_properties_allowed_when_all_optional() {
        let mut entry = ResourceEntry::new("AWS::Glue::Workflow", json!({}));
        entry.properties = None;
        let parsed = GlueResource::from_entry(&entry).unwrap().unwrap();
        assert_eq!(parsed.kind(), ResourceKind::Workflow);
        assert!(parsed.validate().is_empty());
    }

    #[test]
    fn test_cg010_validate_dispatch() {
        let trigger = trigger::Trigger::new("SCHEDULED", vec![trigger::Action::job("j")]);
        let errors = GlueResource::from(trigger).validate();
        assert_eq!(errors, vec!["Schedule is required for SCHEDULED triggers"]);
    }

    #[test]
    fn test_cg010_intrinsics_survive_roundtrip() {
        let sv = SchemaVersion {
            schema: schema_registry::SchemaIdentifier {
                schema_arn: Some(Value::get_att("OrderSchema", "Arn")),
                ..Default::default()
            },
            schema_definition: Value::sub("${Definition}"),
        };
        let props = GlueResource::from(sv.clone()).render_properties().unwrap();
        assert_eq!(props["Schema"]["SchemaArn"], json!({"Fn::GetAtt": ["OrderSchema", "Arn"]}));
        assert_eq!(props["SchemaDefinition"], json!({"Fn::Sub": "${Definition}"}));
        let back = GlueResource::from_properties(ResourceKind::SchemaVersion, &props).unwrap();
        assert_eq!(back, GlueResource::SchemaVersion(sv));
    }

    #[test]
    fn test_cg010_json_schema_has_required() {
        let schema = serde_json::to_value(ResourceKind::Registry.json_schema()).unwrap();
        assert_eq!(schema["required"], json!(["Name"]));
        assert!(schema["properties"]["Tags"].is_object());
    }
}
