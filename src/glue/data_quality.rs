//! `AWS::Glue::DataQualityRuleset` and `AWS::Glue::CustomEntityType`.

use super::common::{check_non_empty, literal_str, GlueProperties, TagMap};
use crate::core::types::Value;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DataQualityRuleset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_token: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    /// DQDL source, e.g. `Rules = [ IsComplete "id" ]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_table: Option<DataQualityTargetTable>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DataQualityTargetTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<Value<String>>,
}

impl GlueProperties for DataQualityRuleset {
    fn validate(&self, errors: &mut Vec<String>) {
        if let Some(rules) = literal_str(self.ruleset.as_ref()) {
            if !rules.trim_start().starts_with("Rules") {
                errors.push("Ruleset must start with a `Rules = [...]` block".to_string());
            }
        }
        if let Some(t) = &self.target_table {
            if t.database_name.is_some() != t.table_name.is_some() {
                errors.push("TargetTable needs both DatabaseName and TableName".to_string());
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CustomEntityType {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_words: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex_string: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagMap>,
}

impl GlueProperties for CustomEntityType {
    fn validate(&self, errors: &mut Vec<String>) {
        check_non_empty(errors, "Name", self.name.as_ref());
        if let Some(pattern) = literal_str(self.regex_string.as_ref()) {
            if let Err(e) = Regex::new(pattern) {
                errors.push(format!("RegexString is not a valid pattern: {}", e));
            }
        }
        for (i, word) in self.context_words.iter().enumerate() {
            check_non_empty(errors, &format!("ContextWords[{}]", i), Some(word));
        }
    }
}
