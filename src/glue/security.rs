//! `AWS::Glue::SecurityConfiguration`.

use super::common::{check_enum, check_non_empty, literal_str, GlueProperties};
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct SecurityConfiguration {
    pub encryption_configuration: EncryptionConfiguration,

    pub name: Value<String>,
}

impl SecurityConfiguration {
    pub fn new(name: impl Into<Value<String>>, encryption_configuration: EncryptionConfiguration) -> Self {
        Self {
            encryption_configuration,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct EncryptionConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_watch_encryption: Option<CloudWatchEncryption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_bookmarks_encryption: Option<JobBookmarksEncryption>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub s3_encryptions: Vec<S3Encryption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CloudWatchEncryption {
    /// DISABLED | SSE-KMS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_watch_encryption_mode: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_arn: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct JobBookmarksEncryption {
    /// DISABLED | CSE-KMS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_bookmarks_encryption_mode: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_arn: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct S3Encryption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_arn: Option<Value<String>>,

    /// DISABLED | SSE-KMS | SSE-S3
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_encryption_mode: Option<Value<String>>,
}

/// A KMS mode without a key ARN.
fn check_kms_key(
    errors: &mut Vec<String>,
    field: &str,
    mode: Option<&Value<String>>,
    key: Option<&Value<String>>,
) {
    let kms = literal_str(mode).is_some_and(|m| m.ends_with("-KMS"));
    if kms && key.is_none() {
        errors.push(format!("{}.KmsKeyArn is required for KMS encryption", field));
    }
}

impl GlueProperties for SecurityConfiguration {
    fn validate(&self, errors: &mut Vec<String>) {
        check_non_empty(errors, "Name", Some(&self.name));
        let cfg = &self.encryption_configuration;
        if let Some(cw) = &cfg.cloud_watch_encryption {
            check_enum(
                errors,
                "CloudWatchEncryption.CloudWatchEncryptionMode",
                cw.cloud_watch_encryption_mode.as_ref(),
                &["DISABLED", "SSE-KMS"],
            );
            check_kms_key(
                errors,
                "CloudWatchEncryption",
                cw.cloud_watch_encryption_mode.as_ref(),
                cw.kms_key_arn.as_ref(),
            );
        }
        if let Some(jb) = &cfg.job_bookmarks_encryption {
            check_enum(
                errors,
                "JobBookmarksEncryption.JobBookmarksEncryptionMode",
                jb.job_bookmarks_encryption_mode.as_ref(),
                &["DISABLED", "CSE-KMS"],
            );
            check_kms_key(
                errors,
                "JobBookmarksEncryption",
                jb.job_bookmarks_encryption_mode.as_ref(),
                jb.kms_key_arn.as_ref(),
            );
        }
        for (i, s3) in cfg.s3_encryptions.iter().enumerate() {
            let field = format!("S3Encryptions[{}]", i);
            check_enum(
                errors,
                &format!("{}.S3EncryptionMode", field),
                s3.s3_encryption_mode.as_ref(),
                &["DISABLED", "SSE-KMS", "SSE-S3"],
            );
            check_kms_key(errors, &field, s3.s3_encryption_mode.as_ref(), s3.kms_key_arn.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cg019_render() {
        let sc = SecurityConfiguration::new(
            "etl-kms",
            EncryptionConfiguration {
                s3_encryptions: vec![S3Encryption {
                    kms_key_arn: Some(Value::get_att("Key", "Arn")),
                    s3_encryption_mode: Some("SSE-KMS".into()),
                }],
                job_bookmarks_encryption: Some(JobBookmarksEncryption {
                    job_bookmarks_encryption_mode: Some("DISABLED".into()),
                    kms_key_arn: None,
                }),
                ..Default::default()
            },
        );
        let v = serde_json::to_value(&sc).unwrap();
        assert_eq!(
            v["EncryptionConfiguration"]["S3Encryptions"][0]["S3EncryptionMode"],
            json!("SSE-KMS")
        );
        assert_eq!(
            v["EncryptionConfiguration"]["JobBookmarksEncryption"],
            json!({"JobBookmarksEncryptionMode": "DISABLED"})
        );
        let mut errors = Vec::new();
        sc.validate(&mut errors);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_cg019_kms_needs_key() {
        let sc = SecurityConfiguration::new(
            "bad",
            EncryptionConfiguration {
                cloud_watch_encryption: Some(CloudWatchEncryption {
                    cloud_watch_encryption_mode: Some("SSE-KMS".into()),
                    kms_key_arn: None,
                }),
                job_bookmarks_encryption: Some(JobBookmarksEncryption {
                    job_bookmarks_encryption_mode: Some("SSE-KMS".into()),
                    kms_key_arn: Some("arn".into()),
                }),
                s3_encryptions: vec![S3Encryption {
                    kms_key_arn: None,
                    s3_encryption_mode: Some("SSE-S3".into()),
                }],
            },
        );
        let mut errors = Vec::new();
        sc.validate(&mut errors);
        assert_eq!(errors.len(), 2, "{:?}", errors);
        assert!(errors.iter().any(|e| e.contains("CloudWatchEncryption.KmsKeyArn")));
        assert!(errors.iter().any(|e| e.contains("JobBookmarksEncryptionMode")));
    }
}
