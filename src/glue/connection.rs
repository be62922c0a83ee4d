//! `AWS::Glue::Connection`: data-store connection definitions.

use super::common::{check_enum, GlueProperties};
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CONNECTION_TYPES: &[&str] = &[
    "JDBC",
    "SFTP",
    "MONGODB",
    "KAFKA",
    "NETWORK",
    "MARKETPLACE",
    "CUSTOM",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Connection {
    /// Account id of the Data Catalog
    pub catalog_id: Value<String>,

    pub connection_input: ConnectionInput,
}

impl Connection {
    pub fn new(catalog_id: impl Into<Value<String>>, connection_input: ConnectionInput) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            connection_input,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ConnectionInput {
    /// Key/value pairs such as `JDBC_CONNECTION_URL`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_properties: Option<serde_json::Value>,

    pub connection_type: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_criteria: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_connection_requirements: Option<PhysicalConnectionRequirements>,
}

impl ConnectionInput {
    pub fn new(connection_type: impl Into<Value<String>>) -> Self {
        Self {
            connection_properties: None,
            connection_type: connection_type.into(),
            description: None,
            match_criteria: Vec::new(),
            name: None,
            physical_connection_requirements: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct PhysicalConnectionRequirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_id_list: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<Value<String>>,
}

impl GlueProperties for Connection {
    fn validate(&self, errors: &mut Vec<String>) {
        check_enum(
            errors,
            "ConnectionInput.ConnectionType",
            Some(&self.connection_input.connection_type),
            CONNECTION_TYPES,
        );
    }
}
