//! `AWS::Glue::Trigger` and `AWS::Glue::Workflow`.

use super::common::{check_enum, check_min, literal_str, GlueProperties, TagMap};
use super::job::NotificationProperty;
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const TRIGGER_TYPES: &[&str] = &["CONDITIONAL", "ON_DEMAND", "SCHEDULED", "EVENT"];

const JOB_STATES: &[&str] = &["SUCCEEDED", "STOPPED", "TIMEOUT", "FAILED"];

const CRAWL_STATES: &[&str] = &["SUCCEEDED", "FAILED", "CANCELLED"];

// ============================================================================
// Trigger
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Trigger {
    pub actions: Vec<Action>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_batching_condition: Option<EventBatchingCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,

    /// cron expression, e.g. `cron(15 12 * * ? *)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_on_creation: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,

    #[serde(rename = "Type")]
    pub trigger_type: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<Value<String>>,
}

impl Trigger {
    pub fn new(trigger_type: impl Into<Value<String>>, actions: Vec<Action>) -> Self {
        Self {
            actions,
            description: None,
            event_batching_condition: None,
            name: None,
            predicate: None,
            schedule: None,
            start_on_creation: None,
            tags: None,
            trigger_type: trigger_type.into(),
            workflow_name: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawler_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_property: Option<NotificationProperty>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_configuration: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Value<i64>>,
}

impl Action {
    pub fn job(name: impl Into<Value<String>>) -> Self {
        Self {
            job_name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn crawler(name: impl Into<Value<String>>) -> Self {
        Self {
            crawler_name: Some(name.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct EventBatchingCondition {
    pub batch_size: Value<i64>,

    /// Seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_window: Option<Value<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Predicate {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// AND | ANY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical: Option<Value<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_state: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawler_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical_operator: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value<String>>,
}

impl Condition {
    /// Fires when the named job reaches `state`.
    pub fn job_state(job_name: impl Into<Value<String>>, state: impl Into<Value<String>>) -> Self {
        Self {
            job_name: Some(job_name.into()),
            logical_operator: Some("EQUALS".into()),
            state: Some(state.into()),
            ..Default::default()
        }
    }
}

impl GlueProperties for Trigger {
    fn validate(&self, errors: &mut Vec<String>) {
        check_enum(errors, "Type", Some(&self.trigger_type), TRIGGER_TYPES);
        match literal_str(Some(&self.trigger_type)) {
            Some("SCHEDULED") if self.schedule.is_none() => {
                errors.push("Schedule is required for SCHEDULED triggers".to_string());
            }
            Some("CONDITIONAL") if self.predicate.is_none() => {
                errors.push("Predicate is required for CONDITIONAL triggers".to_string());
            }
            Some("ON_DEMAND") if self.schedule.is_some() => {
                errors.push("Schedule is not allowed on ON_DEMAND triggers".to_string());
            }
            _ => {}
        }

        if self.actions.is_empty() {
            errors.push("Actions must not be empty".to_string());
        }
        for (i, action) in self.actions.iter().enumerate() {
            if action.job_name.is_some() == action.crawler_name.is_some() {
                errors.push(format!(
                    "Actions[{}] must set exactly one of JobName, CrawlerName",
                    i
                ));
            }
            check_min(errors, &format!("Actions[{}].Timeout", i), action.timeout.as_ref(), 1);
        }

        if let Some(p) = &self.predicate {
            check_enum(errors, "Predicate.Logical", p.logical.as_ref(), &["AND", "ANY"]);
            for (i, c) in p.conditions.iter().enumerate() {
                let field = format!("Predicate.Conditions[{}]", i);
                check_enum(
                    errors,
                    &format!("{}.LogicalOperator", field),
                    c.logical_operator.as_ref(),
                    &["EQUALS"],
                );
                check_enum(errors, &format!("{}.State", field), c.state.as_ref(), JOB_STATES);
                check_enum(
                    errors,
                    &format!("{}.CrawlState", field),
                    c.crawl_state.as_ref(),
                    CRAWL_STATES,
                );
            }
        }

        if let Some(b) = &self.event_batching_condition {
            check_min(errors, "EventBatchingCondition.BatchSize", Some(&b.batch_size), 1);
            check_min(errors, "EventBatchingCondition.BatchWindow", b.batch_window.as_ref(), 1);
        }
    }
}

// ============================================================================
// Workflow
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Workflow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_run_properties: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent_runs: Option<Value<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

impl GlueProperties for Workflow {
    fn validate(&self, errors: &mut Vec<String>) {
        check_min(errors, "MaxConcurrentRuns", self.max_concurrent_runs.as_ref(), 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cg020_conditional_trigger() {
        let mut t = Trigger::new("CONDITIONAL", vec![Action::job(Value::reference("LoadJob"))]);
        t.predicate = Some(Predicate {
            conditions: vec![Condition::job_state(Value::reference("ExtractJob"), "SUCCEEDED")],
            logical: Some("AND".into()),
        });
        t.start_on_creation = Some(true.into());
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["Type"], json!("CONDITIONAL"));
        assert_eq!(v["Actions"], json!([{"JobName": {"Ref": "LoadJob"}}]));
        assert_eq!(
            v["Predicate"]["Conditions"][0],
            json!({"JobName": {"Ref": "ExtractJob"}, "LogicalOperator": "EQUALS", "State": "SUCCEEDED"})
        );
        let mut errors = Vec::new();
        t.validate(&mut errors);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_cg020_type_requirements() {
        let scheduled = Trigger::new("SCHEDULED", vec![Action::crawler("nightly")]);
        let mut errors = Vec::new();
        scheduled.validate(&mut errors);
        assert_eq!(errors, vec!["Schedule is required for SCHEDULED triggers"]);

        let conditional = Trigger::new("CONDITIONAL", vec![Action::crawler("nightly")]);
        let mut errors = Vec::new();
        conditional.validate(&mut errors);
        assert_eq!(errors, vec!["Predicate is required for CONDITIONAL triggers"]);
    }

    #[test]
    fn test_cg020_actions() {
        let both = Action {
            job_name: Some("a".into()),
            crawler_name: Some("b".into()),
            ..Default::default()
        };
        let t = Trigger::new("ON_DEMAND", vec![both, Action::default()]);
        let mut errors = Vec::new();
        t.validate(&mut errors);
        assert_eq!(errors.len(), 2, "{:?}", errors);

        let empty = Trigger::new("ON_DEMAND", vec![]);
        let mut errors = Vec::new();
        empty.validate(&mut errors);
        assert_eq!(errors, vec!["Actions must not be empty"]);
    }

    #[test]
    fn test_cg020_bad_enums() {
        let mut t = Trigger::new("WEEKLY", vec![Action::job("j")]);
        t.predicate = Some(Predicate {
            conditions: vec![Condition {
                crawler_name: Some("c".into()),
                crawl_state: Some("DONE".into()),
                ..Default::default()
            }],
            logical: Some("OR".into()),
        });
        let mut errors = Vec::new();
        t.validate(&mut errors);
        assert_eq!(errors.len(), 3, "{:?}", errors);
    }

    #[test]
    fn test_cg020_intrinsic_type_is_not_checked() {
        let t = Trigger::new(Value::reference("TriggerType"), vec![Action::job("j")]);
        let mut errors = Vec::new();
        t.validate(&mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_cg020_workflow() {
        let w = Workflow {
            name: Some("etl".into()),
            default_run_properties: Some(json!({"stage": "prod"})),
            max_concurrent_runs: Some(Value::Literal(0)),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&w).unwrap(),
            json!({"DefaultRunProperties": {"stage": "prod"}, "MaxConcurrentRuns": 0, "Name": "etl"})
        );
        let mut errors = Vec::new();
        w.validate(&mut errors);
        assert_eq!(errors.len(), 1);
    }
}
