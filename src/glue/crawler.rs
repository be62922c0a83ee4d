//! `AWS::Glue::Crawler`: crawlers and their data-store targets.

use super::common::{check_enum, GlueProperties, TagMap};
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Crawler {
    /// Names of custom classifiers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifiers: Vec<Value<String>>,

    /// Versioned JSON string of crawler behavior overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawler_security_configuration: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lake_formation_configuration: Option<LakeFormationConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recrawl_policy: Option<RecrawlPolicy>,

    /// IAM role name or ARN
    pub role: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_change_policy: Option<SchemaChangePolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_prefix: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,

    pub targets: Targets,
}

impl Crawler {
    pub fn new(role: impl Into<Value<String>>, targets: Targets) -> Self {
        Self {
            classifiers: Vec::new(),
            configuration: None,
            crawler_security_configuration: None,
            database_name: None,
            description: None,
            lake_formation_configuration: None,
            name: None,
            recrawl_policy: None,
            role: role.into(),
            schedule: None,
            schema_change_policy: None,
            table_prefix: None,
            tags: None,
            targets,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct LakeFormationConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_lake_formation_credentials: Option<Value<bool>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct RecrawlPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recrawl_behavior: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Schedule {
    /// cron expression, e.g. `cron(15 12 * * ? *)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_expression: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SchemaChangePolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_behavior: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_behavior: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Targets {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub catalog_targets: Vec<CatalogTarget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delta_targets: Vec<DeltaTarget>,

    #[serde(rename = "DynamoDBTargets", default, skip_serializing_if = "Vec::is_empty")]
    pub dynamo_db_targets: Vec<DynamoDbTarget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hudi_targets: Vec<OpenTableTarget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub iceberg_targets: Vec<OpenTableTarget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub jdbc_targets: Vec<JdbcTarget>,

    #[serde(rename = "MongoDBTargets", default, skip_serializing_if = "Vec::is_empty")]
    pub mongo_db_targets: Vec<MongoDbTarget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub s3_targets: Vec<S3Target>,
}

impl Targets {
    pub fn len(&self) -> usize {
        self.catalog_targets.len()
            + self.delta_targets.len()
            + self.dynamo_db_targets.len()
            + self.hudi_targets.len()
            + self.iceberg_targets.len()
            + self.jdbc_targets.len()
            + self.mongo_db_targets.len()
            + self.s3_targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CatalogTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlq_event_queue_arn: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_queue_arn: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DeltaTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_native_delta_table: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub delta_tables: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_manifest: Option<Value<bool>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DynamoDbTarget {
    /// Table name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_all: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_rate: Option<Value<f64>>,
}

/// Hudi and Iceberg targets share one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct OpenTableTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_traversal_depth: Option<Value<i64>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct JdbcTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enable_additional_metadata: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct MongoDbTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct S3Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dlq_event_queue_arn: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_queue_arn: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<Value<i64>>,
}

impl S3Target {
    pub fn path(path: impl Into<Value<String>>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }
}

impl GlueProperties for Crawler {
    fn validate(&self, errors: &mut Vec<String>) {
        if self.targets.is_empty() {
            errors.push("Targets must declare at least one target".to_string());
        }
        if let Some(policy) = &self.recrawl_policy {
            check_enum(
                errors,
                "RecrawlPolicy.RecrawlBehavior",
                policy.recrawl_behavior.as_ref(),
                &["CRAWL_EVERYTHING", "CRAWL_NEW_FOLDERS_ONLY", "CRAWL_EVENT_MODE"],
            );
        }
        if let Some(policy) = &self.schema_change_policy {
            check_enum(
                errors,
                "SchemaChangePolicy.DeleteBehavior",
                policy.delete_behavior.as_ref(),
                &["LOG", "DELETE_FROM_DATABASE", "DEPRECATE_IN_DATABASE"],
            );
            check_enum(
                errors,
                "SchemaChangePolicy.UpdateBehavior",
                policy.update_behavior.as_ref(),
                &["LOG", "UPDATE_IN_DATABASE"],
            );
        }
        for (i, t) in self.targets.s3_targets.iter().enumerate() {
            if t.path.is_none() {
                errors.push(format!("Targets.S3Targets[{}] has no Path", i));
            }
        }
    }
}
