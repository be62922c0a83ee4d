//! `AWS::Glue::Database` and `AWS::Glue::DataCatalogEncryptionSettings`.

use super::common::{check_enum, literal_str, GlueProperties};
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Database
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Database {
    /// Usually `{"Ref": "AWS::AccountId"}`
    pub catalog_id: Value<String>,

    pub database_input: DatabaseInput,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<Value<String>>,
}

impl Database {
    pub fn new(catalog_id: impl Into<Value<String>>, database_input: DatabaseInput) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            database_input,
            database_name: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DatabaseInput {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create_table_default_permissions: Vec<PrincipalPrivileges>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub federated_database: Option<FederatedDatabase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_uri: Option<Value<String>>,

    /// Lowercase; CloudFormation folds mixed-case names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_database: Option<DatabaseIdentifier>,
}

impl DatabaseInput {
    pub fn named(name: impl Into<Value<String>>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PrincipalPrivileges {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<DataLakePrincipal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DataLakePrincipal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_lake_principal_identifier: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FederatedDatabase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Value<String>>,
}

/// Target of a resource-link database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DatabaseIdentifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Value<String>>,
}

const LAKE_FORMATION_PERMISSIONS: &[&str] = &[
    "ALL",
    "SELECT",
    "ALTER",
    "DROP",
    "DELETE",
    "INSERT",
    "CREATE_DATABASE",
    "CREATE_TABLE",
    "DATA_LOCATION_ACCESS",
];

impl GlueProperties for Database {
    fn validate(&self, errors: &mut Vec<String>) {
        let input = &self.database_input;
        for (i, grant) in input.create_table_default_permissions.iter().enumerate() {
            for p in &grant.permissions {
                check_enum(
                    errors,
                    &format!("DatabaseInput.CreateTableDefaultPermissions[{}].Permissions", i),
                    Some(p),
                    LAKE_FORMATION_PERMISSIONS,
                );
            }
        }
        if input.federated_database.is_some() && input.target_database.is_some() {
            errors.push(
                "DatabaseInput.FederatedDatabase and DatabaseInput.TargetDatabase are mutually exclusive"
                    .to_string(),
            );
        }
    }
}

// ============================================================================
// DataCatalogEncryptionSettings
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DataCatalogEncryptionSettings {
    pub catalog_id: Value<String>,

    pub data_catalog_encryption_settings: EncryptionSettings,
}

impl DataCatalogEncryptionSettings {
    pub fn new(catalog_id: impl Into<Value<String>>, settings: EncryptionSettings) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            data_catalog_encryption_settings: settings,
        }
    }
}

/// The nested `DataCatalogEncryptionSettings` property type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct EncryptionSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_password_encryption: Option<ConnectionPasswordEncryption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_at_rest: Option<EncryptionAtRest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ConnectionPasswordEncryption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_connection_password_encrypted: Option<Value<bool>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct EncryptionAtRest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_encryption_mode: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_encryption_service_role: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sse_aws_kms_key_id: Option<Value<String>>,
}

impl GlueProperties for DataCatalogEncryptionSettings {
    fn validate(&self, errors: &mut Vec<String>) {
        let settings = &self.data_catalog_encryption_settings;
        if let Some(at_rest) = &settings.encryption_at_rest {
            check_enum(
                errors,
                "EncryptionAtRest.CatalogEncryptionMode",
                at_rest.catalog_encryption_mode.as_ref(),
                &["DISABLED", "SSE-KMS", "SSE-KMS-WITH-SERVICE-ROLE"],
            );
            let mode = literal_str(at_rest.catalog_encryption_mode.as_ref());
            if mode == Some("SSE-KMS-WITH-SERVICE-ROLE")
                && at_rest.catalog_encryption_service_role.is_none()
            {
                errors.push(
                    "EncryptionAtRest.CatalogEncryptionServiceRole is required for SSE-KMS-WITH-SERVICE-ROLE"
                        .to_string(),
                );
            }
        }
        if let Some(pw) = &settings.connection_password_encryption {
            let encrypted = matches!(
                pw.return_connection_password_encrypted,
                Some(Value::Literal(true))
            );
            if encrypted && pw.kms_key_id.is_none() {
                errors.push(
                    "ConnectionPasswordEncryption.KmsKeyId is required when ReturnConnectionPasswordEncrypted is true"
                        .to_string(),
                );
            }
        }
    }
}
