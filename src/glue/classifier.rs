//! `AWS::Glue::Classifier`: custom classifiers used by crawlers.

use super::common::{check_enum, GlueProperties};
use crate::core::types::Value;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Exactly one classifier kind must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Classifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_classifier: Option<CsvClassifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grok_classifier: Option<GrokClassifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_classifier: Option<JsonClassifier>,

    #[serde(rename = "XMLClassifier", default, skip_serializing_if = "Option::is_none")]
    pub xml_classifier: Option<XmlClassifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CsvClassifier {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_single_column: Option<Value<bool>>,

    /// UNKNOWN | PRESENT | ABSENT
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_header: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_datatype_configured: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_datatypes: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_value_trimming: Option<Value<bool>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub header: Vec<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_symbol: Option<Value<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct GrokClassifier {
    pub classification: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_patterns: Option<Value<String>>,

    pub grok_pattern: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct JsonClassifier {
    pub json_path: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct XmlClassifier {
    pub classification: Value<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value<String>>,

    pub row_tag: Value<String>,
}

impl GlueProperties for Classifier {
    fn validate(&self, errors: &mut Vec<String>) {
        let kinds = [
            self.csv_classifier.is_some(),
            self.grok_classifier.is_some(),
            self.json_classifier.is_some(),
            self.xml_classifier.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if kinds != 1 {
            errors.push(format!(
                "exactly one of CsvClassifier, GrokClassifier, JsonClassifier, XMLClassifier must be set, got {}",
                kinds
            ));
        }
        if let Some(csv) = &self.csv_classifier {
            check_enum(
                errors,
                "CsvClassifier.ContainsHeader",
                csv.contains_header.as_ref(),
                &["UNKNOWN", "PRESENT", "ABSENT"],
            );
        }
    }
}
