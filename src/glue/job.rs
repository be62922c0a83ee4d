//! `AWS::Glue::Job` and `AWS::Glue::DevEndpoint`.

use super::common::{check_enum, check_min, GlueProperties, TagMap};
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const WORKER_TYPES: &[&str] = &["Standard", "G.025X", "G.1X", "G.2X", "G.4X", "G.8X", "Z.2X"];

pub const COMMAND_NAMES: &[&str] = &["glueetl", "pythonshell", "gluestreaming", "glueray"];

// ============================================================================
// Job
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Job {
    /// Deprecated in favor of MaxCapacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated_capacity: Option<Value<f64>>,

    pub command: JobCommand,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<ConnectionsList>,

    /// `--key: value` job arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_arguments: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    /// FLEX | STANDARD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_class: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_property: Option<ExecutionProperty>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glue_version: Option<Value<String>>,

    /// SCRIPT | VISUAL | NOTEBOOK
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_mode: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_run_queuing_enabled: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_uri: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_window: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<Value<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<Value<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_overridable_arguments: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_property: Option<NotificationProperty>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_workers: Option<Value<i64>>,

    /// IAM role name or ARN
    pub role: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_configuration: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,

    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Value<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<Value<String>>,
}

impl Job {
    pub fn new(role: impl Into<Value<String>>, command: JobCommand) -> Self {
        Self {
            allocated_capacity: None,
            command,
            connections: None,
            default_arguments: None,
            description: None,
            execution_class: None,
            execution_property: None,
            glue_version: None,
            job_mode: None,
            job_run_queuing_enabled: None,
            log_uri: None,
            maintenance_window: None,
            max_capacity: None,
            max_retries: None,
            name: None,
            non_overridable_arguments: None,
            notification_property: None,
            number_of_workers: None,
            role: role.into(),
            security_configuration: None,
            tags: None,
            timeout: None,
            worker_type: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct JobCommand {
    /// glueetl | pythonshell | gluestreaming | glueray
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_version: Option<Value<String>>,

    /// Ray runtime, e.g. `Ray2.4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_location: Option<Value<String>>,
}

impl JobCommand {
    pub fn etl(script_location: impl Into<Value<String>>) -> Self {
        Self {
            name: Some("glueetl".into()),
            python_version: Some("3".into()),
            runtime: None,
            script_location: Some(script_location.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ConnectionsList {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ExecutionProperty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_runs: Option<Value<f64>>,
}

/// Shared by jobs and trigger actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct NotificationProperty {
    /// Minutes before a delay notification is sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_delay_after: Option<Value<i64>>,
}

/// WorkerType/NumberOfWorkers go together and exclude the legacy capacity field.
fn validate_capacity(
    errors: &mut Vec<String>,
    legacy_capacity: Option<&str>,
    worker_type: Option<&Value<String>>,
    number_of_workers: Option<&Value<i64>>,
) {
    check_enum(errors, "WorkerType", worker_type, WORKER_TYPES);
    check_min(errors, "NumberOfWorkers", number_of_workers, 1);
    if worker_type.is_some() != number_of_workers.is_some() {
        errors.push("WorkerType and NumberOfWorkers must be set together".to_string());
    }
    if let Some(field) = legacy_capacity {
        if worker_type.is_some() || number_of_workers.is_some() {
            errors.push(format!(
                "{} cannot be combined with WorkerType/NumberOfWorkers",
                field
            ));
        }
    }
}

impl GlueProperties for Job {
    fn validate(&self, errors: &mut Vec<String>) {
        check_enum(errors, "Command.Name", self.command.name.as_ref(), COMMAND_NAMES);
        check_enum(
            errors,
            "ExecutionClass",
            self.execution_class.as_ref(),
            &["FLEX", "STANDARD"],
        );
        check_enum(
            errors,
            "JobMode",
            self.job_mode.as_ref(),
            &["SCRIPT", "VISUAL", "NOTEBOOK"],
        );
        validate_capacity(
            errors,
            self.max_capacity.as_ref().map(|_| "MaxCapacity"),
            self.worker_type.as_ref(),
            self.number_of_workers.as_ref(),
        );
        check_min(errors, "Timeout", self.timeout.as_ref(), 1);
        if let Some(n) = &self.notification_property {
            check_min(errors, "NotificationProperty.NotifyDelayAfter", n.notify_delay_after.as_ref(), 1);
        }
    }
}

// ============================================================================
// DevEndpoint
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DevEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_jars_s3_path: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_python_libs_s3_path: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glue_version: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_nodes: Option<Value<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_workers: Option<Value<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_keys: Vec<Value<String>>,

    pub role_arn: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_configuration: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_group_ids: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet_id: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<Value<String>>,
}

impl DevEndpoint {
    pub fn new(role_arn: impl Into<Value<String>>) -> Self {
        Self {
            arguments: None,
            endpoint_name: None,
            extra_jars_s3_path: None,
            extra_python_libs_s3_path: None,
            glue_version: None,
            number_of_nodes: None,
            number_of_workers: None,
            public_key: None,
            public_keys: Vec::new(),
            role_arn: role_arn.into(),
            security_configuration: None,
            security_group_ids: Vec::new(),
            subnet_id: None,
            tags: None,
            worker_type: None,
        }
    }
}

impl GlueProperties for DevEndpoint {
    fn validate(&self, errors: &mut Vec<String>) {
        validate_capacity(
            errors,
            self.number_of_nodes.as_ref().map(|_| "NumberOfNodes"),
            self.worker_type.as_ref(),
            self.number_of_workers.as_ref(),
        );
        if self.public_key.is_some() && !self.public_keys.is_empty() {
            errors.push("PublicKey and PublicKeys are mutually exclusive".to_string());
        }
        if !self.security_group_ids.is_empty() && self.subnet_id.is_none() {
            errors.push("SecurityGroupIds requires SubnetId".to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn etl_job() -> Job {
        let mut job = Job::new(
            Value::get_att("JobRole", "Arn"),
            JobCommand::etl("s3://scripts/etl.py"),
        );
        job.glue_version = Some("4.0".into());
        job.worker_type = Some("G.1X".into());
        job.number_of_workers = Some(Value::Literal(10));
        job.default_arguments = Some(json!({"--job-bookmark-option": "job-bookmark-enable"}));
        job
    }

    #[test]
    fn test_cg016_job_render() {
        let v = serde_json::to_value(etl_job()).unwrap();
        assert_eq!(
            v["Command"],
            json!({"Name": "glueetl", "PythonVersion": "3", "ScriptLocation": "s3://scripts/etl.py"})
        );
        assert_eq!(v["NumberOfWorkers"], json!(10));
        assert_eq!(v["DefaultArguments"]["--job-bookmark-option"], json!("job-bookmark-enable"));
        assert!(v.get("MaxCapacity").is_none());
    }

    #[test]
    fn test_cg016_job_validate_ok() {
        let mut errors = Vec::new();
        etl_job().validate(&mut errors);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_cg016_job_capacity_conflicts() {
        let mut job = etl_job();
        job.max_capacity = Some(Value::Literal(2.0));
        job.number_of_workers = None;
        let mut errors = Vec::new();
        job.validate(&mut errors);
        assert!(errors.iter().any(|e| e.contains("set together")));
        assert!(errors.iter().any(|e| e.contains("MaxCapacity")));
    }

    #[test]
    fn test_cg016_job_enums() {
        let mut job = etl_job();
        job.command.name = Some("sparkjob".into());
        job.worker_type = Some("G.16X".into());
        job.execution_class = Some("CHEAP".into());
        let mut errors = Vec::new();
        job.validate(&mut errors);
        assert_eq!(errors.len(), 3, "{:?}", errors);
    }

    #[test]
    fn test_cg016_job_intrinsic_worker_type_not_checked() {
        let mut job = etl_job();
        job.worker_type = Some(Value::reference("WorkerTypeParam"));
        let mut errors = Vec::new();
        job.validate(&mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_cg016_job_requires_role() {
        let err =
            serde_json::from_value::<Job>(json!({"Command": {"Name": "glueetl"}})).unwrap_err();
        assert!(err.to_string().contains("Role"));
    }

    #[test]
    fn test_cg016_dev_endpoint() {
        let mut ep = DevEndpoint::new("arn:aws:iam::1:role/glue");
        ep.number_of_nodes = Some(Value::Literal(5));
        ep.worker_type = Some("G.1X".into());
        ep.number_of_workers = Some(Value::Literal(2));
        ep.security_group_ids = vec!["sg-1".into()];
        let mut errors = Vec::new();
        ep.validate(&mut errors);
        assert_eq!(errors.len(), 2, "{:?}", errors);
        assert!(errors.iter().any(|e| e.starts_with("NumberOfNodes")));

        let v = serde_json::to_value(&ep).unwrap();
        assert!(v.get("ExtraJarsS3Path").is_none());
        assert_eq!(v["RoleArn"], json!("arn:aws:iam::1:role/glue"));
    }
}
