//! `AWS::Glue::MLTransform`: FindMatches machine-learning transforms.

use super::common::{check_enum, check_min, check_range, GlueProperties, TagMap};
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct MlTransform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glue_version: Option<Value<String>>,

    pub input_record_tables: InputRecordTables,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<Value<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<Value<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_workers: Option<Value<i64>>,

    pub role: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Value<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform_encryption: Option<TransformEncryption>,

    pub transform_parameters: TransformParameters,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<Value<String>>,
}

impl MlTransform {
    pub fn new(
        role: impl Into<Value<String>>,
        input_record_tables: InputRecordTables,
        transform_parameters: TransformParameters,
    ) -> Self {
        Self {
            description: None,
            glue_version: None,
            input_record_tables,
            max_capacity: None,
            max_retries: None,
            name: None,
            number_of_workers: None,
            role: role.into(),
            tags: None,
            timeout: None,
            transform_encryption: None,
            transform_parameters,
            worker_type: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct InputRecordTables {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub glue_tables: Vec<GlueTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct GlueTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<Value<String>>,

    pub database_name: Value<String>,

    pub table_name: Value<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TransformParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find_matches_parameters: Option<FindMatchesParameters>,

    /// Only FIND_MATCHES exists
    pub transform_type: Value<String>,
}

impl TransformParameters {
    pub fn find_matches(primary_key_column_name: impl Into<Value<String>>) -> Self {
        Self {
            find_matches_parameters: Some(FindMatchesParameters {
                accuracy_cost_tradeoff: None,
                enforce_provided_labels: None,
                precision_recall_tradeoff: None,
                primary_key_column_name: primary_key_column_name.into(),
            }),
            transform_type: "FIND_MATCHES".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FindMatchesParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_cost_tradeoff: Option<Value<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_provided_labels: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision_recall_tradeoff: Option<Value<f64>>,

    pub primary_key_column_name: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct TransformEncryption {
    #[serde(
        rename = "MLUserDataEncryption",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ml_user_data_encryption: Option<MlUserDataEncryption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_run_security_configuration_name: Option<Value<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct MlUserDataEncryption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<Value<String>>,

    /// DISABLED | SSE-KMS
    #[serde(rename = "MLUserDataEncryptionMode")]
    pub ml_user_data_encryption_mode: Value<String>,
}

impl GlueProperties for MlTransform {
    fn validate(&self, errors: &mut Vec<String>) {
        if self.input_record_tables.glue_tables.is_empty() {
            errors.push("InputRecordTables.GlueTables must not be empty".to_string());
        }
        let params = &self.transform_parameters;
        check_enum(
            errors,
            "TransformParameters.TransformType",
            Some(&params.transform_type),
            &["FIND_MATCHES"],
        );
        match &params.find_matches_parameters {
            Some(fm) => {
                check_range(
                    errors,
                    "FindMatchesParameters.AccuracyCostTradeoff",
                    fm.accuracy_cost_tradeoff.as_ref(),
                    0.0,
                    1.0,
                );
                check_range(
                    errors,
                    "FindMatchesParameters.PrecisionRecallTradeoff",
                    fm.precision_recall_tradeoff.as_ref(),
                    0.0,
                    1.0,
                );
            }
            None => errors.push(
                "TransformParameters.FindMatchesParameters is required for FIND_MATCHES".to_string(),
            ),
        }
        if let Some(enc) = self
            .transform_encryption
            .as_ref()
            .and_then(|e| e.ml_user_data_encryption.as_ref())
        {
            check_enum(
                errors,
                "MLUserDataEncryption.MLUserDataEncryptionMode",
                Some(&enc.ml_user_data_encryption_mode),
                &["DISABLED", "SSE-KMS"],
            );
            if matches!(&enc.ml_user_data_encryption_mode, Value::Literal(m) if m == "SSE-KMS")
                && enc.kms_key_id.is_none()
            {
                errors.push("MLUserDataEncryption.KmsKeyId is required for SSE-KMS".to_string());
            }
        }
        if self.max_capacity.is_some() && self.worker_type.is_some() {
            errors.push("MaxCapacity cannot be combined with WorkerType".to_string());
        }
        check_min(errors, "Timeout", self.timeout.as_ref(), 1);
    }
}
