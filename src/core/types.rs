//! CG-001: Template document types.
//!
//! Defines the CloudFormation template model (parameters, resources, outputs),
//! the intrinsic functions, and the `Value<T>` wrapper used by every scalar
//! Glue property. All types derive Serialize/Deserialize for JSON and YAML
//! roundtripping.

use super::error::{CfnError, Result};
use crate::glue::GlueResource;
use indexmap::IndexMap;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// The only template format version CloudFormation accepts.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// Pseudo parameters valid as `Ref` targets in every template.
pub const PSEUDO_PARAMETERS: &[&str] = &[
    "AWS::AccountId",
    "AWS::NotificationARNs",
    "AWS::NoValue",
    "AWS::Partition",
    "AWS::Region",
    "AWS::StackId",
    "AWS::StackName",
    "AWS::URLSuffix",
];

static LOGICAL_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]{1,255}$").expect("static logical id pattern")
});

/// Logical ids are 1-255 ASCII alphanumerics.
pub fn is_valid_logical_id(id: &str) -> bool {
    LOGICAL_ID.is_match(id)
}

// ============================================================================
// Values and intrinsic functions
// ============================================================================

/// A property value: a literal, or an intrinsic resolved at deploy time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Value<T> {
    Intrinsic(Intrinsic),
    Literal(T),
}

impl<T> Value<T> {
    /// `{"Ref": target}`
    pub fn reference(target: impl Into<String>) -> Self {
        Self::Intrinsic(Intrinsic::Ref(target.into()))
    }

    /// `{"Fn::GetAtt": [resource, attribute]}`
    pub fn get_att(resource: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::Intrinsic(Intrinsic::GetAtt(GetAttArgs::Pair(
            resource.into(),
            attribute.into(),
        )))
    }

    /// `{"Fn::Sub": template}`
    pub fn sub(template: impl Into<String>) -> Self {
        Self::Intrinsic(Intrinsic::Sub(SubArgs::Plain(template.into())))
    }

    /// The literal, if this value is not an intrinsic.
    pub fn literal(&self) -> Option<&T> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Intrinsic(_) => None,
        }
    }

    pub fn is_intrinsic(&self) -> bool {
        matches!(self, Self::Intrinsic(_))
    }
}

impl From<&str> for Value<String> {
    fn from(s: &str) -> Self {
        Self::Literal(s.to_string())
    }
}

impl From<String> for Value<String> {
    fn from(s: String) -> Self {
        Self::Literal(s)
    }
}

impl From<i64> for Value<i64> {
    fn from(n: i64) -> Self {
        Self::Literal(n)
    }
}

impl From<f64> for Value<f64> {
    fn from(n: f64) -> Self {
        Self::Literal(n)
    }
}

impl From<bool> for Value<bool> {
    fn from(b: bool) -> Self {
        Self::Literal(b)
    }
}

impl<T> From<Intrinsic> for Value<T> {
    fn from(i: Intrinsic) -> Self {
        Self::Intrinsic(i)
    }
}

/// CloudFormation intrinsic functions, in long (JSON) form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum Intrinsic {
    #[serde(rename = "Ref")]
    Ref(String),
    #[serde(rename = "Fn::GetAtt")]
    GetAtt(GetAttArgs),
    #[serde(rename = "Fn::Sub")]
    Sub(SubArgs),
    #[serde(rename = "Fn::Join")]
    Join(String, ValueList),
    #[serde(rename = "Fn::Select")]
    Select(u32, ValueList),
    #[serde(rename = "Fn::Split")]
    Split(String, Box<Value<String>>),
    #[serde(rename = "Fn::ImportValue")]
    ImportValue(Box<Value<String>>),
    #[serde(rename = "Fn::Base64")]
    Base64(Box<Value<String>>),
    #[serde(rename = "Fn::GetAZs")]
    GetAzs(Box<Value<String>>),
    /// `[condition, value_if_true, value_if_false]`; branches may be
    /// `{"Ref": "AWS::NoValue"}` or any other value
    #[serde(rename = "Fn::If")]
    If(String, Box<serde_json::Value>, Box<serde_json::Value>),
    /// `[map, top_level_key, second_level_key]`
    #[serde(rename = "Fn::FindInMap")]
    FindInMap(Box<Value<String>>, Box<Value<String>>, Box<Value<String>>),
    /// `[ip_block, count, cidr_bits]`; count and bits may be numbers or strings
    #[serde(rename = "Fn::Cidr")]
    Cidr(Box<Value<String>>, serde_json::Value, serde_json::Value),
}

/// `Fn::GetAtt` accepts `[resource, attribute]` or `"resource.attribute"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum GetAttArgs {
    Pair(String, String),
    Dotted(String),
}

impl GetAttArgs {
    /// Split into `(resource, attribute)`. The dotted form splits on the first dot.
    pub fn parts(&self) -> (&str, &str) {
        match self {
            Self::Pair(r, a) => (r, a),
            Self::Dotted(s) => s.split_once('.').unwrap_or((s.as_str(), "")),
        }
    }
}

/// `Fn::Sub` accepts a template string, or `[template, {var: value}]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SubArgs {
    Plain(String),
    WithVariables(String, IndexMap<String, Value<String>>),
}

/// The list operand of `Fn::Join` / `Fn::Select`: literal items or an intrinsic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ValueList {
    Items(Vec<Value<String>>),
    Intrinsic(Box<Intrinsic>),
}

// ============================================================================
// Template document
// ============================================================================

/// A CloudFormation template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    /// Must be "2010-09-09" when present
    #[serde(
        rename = "AWSTemplateFormatVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub format_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Transform macro(s), e.g. "AWS::Serverless-2016-10-31"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Parameter>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub mappings: IndexMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub conditions: IndexMap<String, serde_json::Value>,

    /// Resource declarations (order-preserving)
    #[serde(default)]
    pub resources: IndexMap<String, ResourceEntry>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: IndexMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self::new()
    }
}

impl Template {
    /// Empty template stamped with the current format version.
    pub fn new() -> Self {
        Self {
            format_version: Some(TEMPLATE_FORMAT_VERSION.to_string()),
            description: None,
            transform: None,
            metadata: None,
            parameters: IndexMap::new(),
            mappings: IndexMap::new(),
            conditions: IndexMap::new(),
            resources: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Render a typed Glue resource and add it under `id`.
    pub fn add_resource(
        &mut self,
        id: &str,
        resource: impl Into<GlueResource>,
    ) -> Result<&mut ResourceEntry> {
        let entry = resource.into().to_entry()?;
        self.add_entry(id, entry)
    }

    /// Add a raw entry (any resource type) under `id`.
    pub fn add_entry(&mut self, id: &str, entry: ResourceEntry) -> Result<&mut ResourceEntry> {
        check_new_id(id, self.resources.contains_key(id) || self.parameters.contains_key(id))?;
        Ok(self.resources.entry(id.to_string()).or_insert(entry))
    }

    pub fn add_parameter(&mut self, id: &str, parameter: Parameter) -> Result<()> {
        check_new_id(id, self.resources.contains_key(id) || self.parameters.contains_key(id))?;
        self.parameters.insert(id.to_string(), parameter);
        Ok(())
    }

    pub fn add_output(&mut self, id: &str, output: Output) -> Result<()> {
        check_new_id(id, self.outputs.contains_key(id))?;
        self.outputs.insert(id.to_string(), output);
        Ok(())
    }
}

fn check_new_id(id: &str, taken: bool) -> Result<()> {
    if !is_valid_logical_id(id) {
        return Err(CfnError::Template(format!(
            "invalid logical id '{}' (must be 1-255 alphanumeric characters)",
            id
        )));
    }
    if taken {
        return Err(CfnError::Template(format!("duplicate logical id '{}'", id)));
    }
    Ok(())
}

/// A single resource declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceEntry {
    /// Resource type, e.g. "AWS::Glue::Job"
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,

    /// Explicit dependencies (other logical ids)
    #[serde(default, skip_serializing_if = "DependsOn::is_empty")]
    pub depends_on: DependsOn,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<DeletionPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<DeletionPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ResourceEntry {
    pub fn new(resource_type: impl Into<String>, properties: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties: Some(properties),
            depends_on: DependsOn::default(),
            condition: None,
            deletion_policy: None,
            update_replace_policy: None,
            metadata: None,
        }
    }

    /// Append an explicit dependency.
    pub fn depend_on(&mut self, id: impl Into<String>) -> &mut Self {
        let mut ids = self.depends_on.to_vec();
        ids.push(id.into());
        self.depends_on = DependsOn::Multiple(ids);
        self
    }

    pub fn is_glue(&self) -> bool {
        self.resource_type.starts_with("AWS::Glue::")
    }
}

/// `DependsOn`: a single logical id or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependsOn {
    Single(String),
    Multiple(Vec<String>),
}

impl Default for DependsOn {
    fn default() -> Self {
        Self::Multiple(Vec::new())
    }
}

impl DependsOn {
    /// Expand to a list of logical ids.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Single(s) => vec![s.clone()],
            Self::Multiple(v) => v.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Multiple(v) if v.is_empty())
    }
}

/// What happens to the physical resource when it leaves the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeletionPolicy {
    Delete,
    Retain,
    Snapshot,
    RetainExceptOnCreate,
}

impl fmt::Display for DeletionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => write!(f, "Delete"),
            Self::Retain => write!(f, "Retain"),
            Self::Snapshot => write!(f, "Snapshot"),
            Self::RetainExceptOnCreate => write!(f, "RetainExceptOnCreate"),
        }
    }
}

/// A template input parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    /// Parameter type, e.g. "String" or "AWS::EC2::Subnet::Id"
    #[serde(rename = "Type")]
    pub parameter_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_echo: Option<bool>,
}

impl Parameter {
    pub fn string() -> Self {
        Self {
            parameter_type: "String".to_string(),
            default: None,
            description: None,
            allowed_values: Vec::new(),
            allowed_pattern: None,
            no_echo: None,
        }
    }
}

/// A template output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    pub value: serde_json::Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl Output {
    pub fn new<T: Serialize>(value: &Value<T>) -> Result<Self> {
        Ok(Self {
            value: serde_json::to_value(value).map_err(|e| CfnError::Render(e.to_string()))?,
            description: None,
            export: None,
            condition: None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: serde_json::Value,
}

// ============================================================================
// Tests
// ============================================================================
