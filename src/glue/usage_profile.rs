//! `AWS::Glue::UsageProfile`: default and allowed values for job and
//! session parameters.

use super::common::{check_non_empty, GlueProperties, Tag};
use crate::core::types::Value;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct UsageProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ProfileConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    pub name: Value<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl UsageProfile {
    pub fn new(name: impl Into<Value<String>>) -> Self {
        Self {
            configuration: None,
            description: None,
            name: name.into(),
            tags: Vec::new(),
        }
    }
}

/// Parameter name (e.g. `numberOfWorkers`) to its constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ProfileConfiguration {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub job_configuration: IndexMap<String, ConfigurationObject>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub session_configuration: IndexMap<String, ConfigurationObject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ConfigurationObject {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<Value<String>>,
}

impl ConfigurationObject {
    fn validate(&self, field: &str, errors: &mut Vec<String>) {
        let ranged = self.min_value.is_some() || self.max_value.is_some();
        if ranged && !self.allowed_values.is_empty() {
            errors.push(format!(
                "{}: AllowedValues cannot be combined with MinValue/MaxValue",
                field
            ));
        }
        if let (Some(Value::Literal(min)), Some(Value::Literal(max))) =
            (&self.min_value, &self.max_value)
        {
            if let (Ok(lo), Ok(hi)) = (min.parse::<f64>(), max.parse::<f64>()) {
                if lo > hi {
                    errors.push(format!("{}: MinValue {} exceeds MaxValue {}", field, min, max));
                }
            }
        }
        if let Some(Value::Literal(default)) = &self.default_value {
            let listed = self
                .allowed_values
                .iter()
                .any(|v| matches!(v, Value::Literal(a) if a == default));
            let all_literal = self.allowed_values.iter().all(|v| !v.is_intrinsic());
            if !self.allowed_values.is_empty() && all_literal && !listed {
                errors.push(format!(
                    "{}: DefaultValue \"{}\" is not in AllowedValues",
                    field, default
                ));
            }
        }
    }
}

impl GlueProperties for UsageProfile {
    fn validate(&self, errors: &mut Vec<String>) {
        check_non_empty(errors, "Name", Some(&self.name));
        if let Some(cfg) = &self.configuration {
            for (key, obj) in &cfg.job_configuration {
                obj.validate(&format!("JobConfiguration.{}", key), errors);
            }
            for (key, obj) in &cfg.session_configuration {
                obj.validate(&format!("SessionConfiguration.{}", key), errors);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cg022_render() {
        let mut p = UsageProfile::new("analysts");
        let mut cfg = ProfileConfiguration::default();
        cfg.job_configuration.insert(
            "workerType".to_string(),
            ConfigurationObject {
                allowed_values: vec!["G.1X".into(), "G.2X".into()],
                default_value: Some("G.1X".into()),
                ..Default::default()
            },
        );
        p.configuration = Some(cfg);
        p.tags.push(Tag::new("team", "bi"));
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(
            v,
            json!({
                "Configuration": {"JobConfiguration": {"workerType": {
                    "AllowedValues": ["G.1X", "G.2X"], "DefaultValue": "G.1X"
                }}},
                "Name": "analysts",
                "Tags": [{"Key": "team", "Value": "bi"}]
            })
        );
        let mut errors = Vec::new();
        p.validate(&mut errors);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_cg022_configuration_checks() {
        let mut p = UsageProfile::new("bad");
        let mut cfg = ProfileConfiguration::default();
        cfg.session_configuration.insert(
            "numberOfWorkers".to_string(),
            ConfigurationObject {
                min_value: Some("10".into()),
                max_value: Some("2".into()),
                allowed_values: vec!["4".into()],
                default_value: Some("8".into()),
            },
        );
        p.configuration = Some(cfg);
        let mut errors = Vec::new();
        p.validate(&mut errors);
        assert_eq!(errors.len(), 3, "{:?}", errors);
        assert!(errors[0].starts_with("SessionConfiguration.numberOfWorkers"));
    }
}
