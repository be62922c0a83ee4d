//! `AWS::Glue::Table`, `AWS::Glue::Partition`, `AWS::Glue::TableOptimizer`.
//!
//! Tables and partitions share the storage descriptor property types.

use super::common::{check_enum, check_min, check_non_empty, literal_str, GlueProperties};
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Storage descriptor (shared)
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct StorageDescriptor {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bucket_columns: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compressed: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_format: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_buckets: Option<Value<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_reference: Option<SchemaReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serde_info: Option<SerdeInfo>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skewed_info: Option<SkewedInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort_columns: Vec<Order>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_as_sub_directories: Option<Value<bool>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Value<String>>,

    pub name: Value<String>,

    /// Hive type string, e.g. `bigint` or `array<string>`
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<Value<String>>,
}

impl Column {
    pub fn new(name: impl Into<Value<String>>, column_type: impl Into<Value<String>>) -> Self {
        Self {
            comment: None,
            name: name.into(),
            column_type: Some(column_type.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Order {
    pub column: Value<String>,

    /// 1 ascending, 0 descending
    pub sort_order: Value<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SerdeInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialization_library: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SkewedInfo {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skewed_column_names: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skewed_column_value_location_maps: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skewed_column_values: Vec<Value<String>>,
}

/// Points a table at a schema in the Glue Schema Registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SchemaReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_id: Option<SchemaId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version_id: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version_number: Option<Value<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SchemaId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_arn: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<Value<String>>,
}

fn validate_storage(errors: &mut Vec<String>, path: &str, sd: &StorageDescriptor) {
    for (i, c) in sd.columns.iter().enumerate() {
        check_non_empty(errors, &format!("{}.Columns[{}].Name", path, i), Some(&c.name));
    }
    for (i, o) in sd.sort_columns.iter().enumerate() {
        if let Value::Literal(n) = o.sort_order {
            if n != 0 && n != 1 {
                errors.push(format!(
                    "{}.SortColumns[{}].SortOrder must be 0 or 1, got {}",
                    path, i, n
                ));
            }
        }
    }
    check_min(
        errors,
        &format!("{}.NumberOfBuckets", path),
        sd.number_of_buckets.as_ref(),
        -1,
    );
    if let Some(reference) = &sd.schema_reference {
        if reference.schema_version_id.is_some() && reference.schema_id.is_some() {
            errors.push(format!(
                "{}.SchemaReference: SchemaVersionId and SchemaId are mutually exclusive",
                path
            ));
        }
    }
}

// ============================================================================
// Table
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Table {
    pub catalog_id: Value<String>,

    pub database_name: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_table_format_input: Option<OpenTableFormatInput>,

    pub table_input: TableInput,
}

impl Table {
    pub fn new(
        catalog_id: impl Into<Value<String>>,
        database_name: impl Into<Value<String>>,
        table_input: TableInput,
    ) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            database_name: database_name.into(),
            open_table_format_input: None,
            table_input,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TableInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub partition_keys: Vec<Column>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<Value<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_descriptor: Option<StorageDescriptor>,

    /// EXTERNAL_TABLE | VIRTUAL_VIEW | GOVERNED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table: Option<TableIdentifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_expanded_text: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_original_text: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TableIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct OpenTableFormatInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iceberg_input: Option<IcebergInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct IcebergInput {
    /// Only `CREATE` is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_operation: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value<String>>,
}

impl GlueProperties for Table {
    fn validate(&self, errors: &mut Vec<String>) {
        let input = &self.table_input;
        check_enum(
            errors,
            "TableInput.TableType",
            input.table_type.as_ref(),
            &["EXTERNAL_TABLE", "VIRTUAL_VIEW", "GOVERNED"],
        );
        for (i, c) in input.partition_keys.iter().enumerate() {
            check_non_empty(errors, &format!("TableInput.PartitionKeys[{}].Name", i), Some(&c.name));
        }
        if let Some(sd) = &input.storage_descriptor {
            validate_storage(errors, "TableInput.StorageDescriptor", sd);
        }
        if literal_str(input.table_type.as_ref()) == Some("VIRTUAL_VIEW")
            && input.view_original_text.is_none()
        {
            errors.push("TableInput.ViewOriginalText is required for VIRTUAL_VIEW".to_string());
        }
        check_min(errors, "TableInput.Retention", input.retention.as_ref(), 0);
        if let Some(iceberg) = self
            .open_table_format_input
            .as_ref()
            .and_then(|o| o.iceberg_input.as_ref())
        {
            check_enum(
                errors,
                "OpenTableFormatInput.IcebergInput.MetadataOperation",
                iceberg.metadata_operation.as_ref(),
                &["CREATE"],
            );
        }
    }
}

// ============================================================================
// Partition
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Partition {
    pub catalog_id: Value<String>,

    pub database_name: Value<String>,

    pub partition_input: PartitionInput,

    pub table_name: Value<String>,
}

impl Partition {
    pub fn new(
        catalog_id: impl Into<Value<String>>,
        database_name: impl Into<Value<String>>,
        table_name: impl Into<Value<String>>,
        partition_input: PartitionInput,
    ) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            database_name: database_name.into(),
            partition_input,
            table_name: table_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PartitionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_descriptor: Option<StorageDescriptor>,

    /// One value per partition key, in key order
    pub values: Vec<Value<String>>,
}

impl GlueProperties for Partition {
    fn validate(&self, errors: &mut Vec<String>) {
        if self.partition_input.values.is_empty() {
            errors.push("PartitionInput.Values must not be empty".to_string());
        }
        if let Some(sd) = &self.partition_input.storage_descriptor {
            validate_storage(errors, "PartitionInput.StorageDescriptor", sd);
        }
    }
}

// ============================================================================
// TableOptimizer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TableOptimizer {
    pub catalog_id: Value<String>,

    pub database_name: Value<String>,

    pub table_name: Value<String>,

    pub table_optimizer_configuration: TableOptimizerConfiguration,

    /// compaction | retention | orphan_file_deletion
    #[serde(rename = "Type")]
    pub optimizer_type: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TableOptimizerConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<Value<String>>,
}

impl GlueProperties for TableOptimizer {
    fn validate(&self, errors: &mut Vec<String>) {
        check_enum(
            errors,
            "Type",
            Some(&self.optimizer_type),
            &["compaction", "retention", "orphan_file_deletion"],
        );
        let cfg = &self.table_optimizer_configuration;
        if matches!(cfg.enabled, Some(Value::Literal(true))) && cfg.role_arn.is_none() {
            errors.push("TableOptimizerConfiguration.RoleArn is required when Enabled".to_string());
        }
    }
}
