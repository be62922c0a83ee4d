//! CG-006: Template parsing and validation.
//!
//! Parses YAML or JSON templates (JSON is read through the YAML parser),
//! expanding short-form intrinsics such as `!Ref X` and `!GetAtt A.B` into
//! their long form, then validates structural constraints:
//! - Format version must be "2010-09-09"
//! - Logical ids are alphanumeric, resources exist, references resolve
//! - `Fn::GetAtt` attributes exist on Glue resource types
//! - Glue properties parse into their typed model and pass its checks
//! - The dependency graph is acyclic

use super::config::ValidateSettings;
use super::error::{CfnError, Result};
use super::resolver::{self, Reference, ReferenceKind};
use super::types::*;
use crate::glue::{GlueResource, ResourceKind};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static RESOURCE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9]+::[A-Za-z0-9]+::[A-Za-z0-9]+|Custom::[A-Za-z0-9_@-]{1,60})$")
        .expect("static resource type pattern")
});

/// Validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Resource, parameter, or output the problem belongs to
    pub logical_id: Option<String>,
    pub message: String,
}

impl ValidationError {
    fn template(message: impl Into<String>) -> Self {
        Self {
            logical_id: None,
            message: message.into(),
        }
    }

    fn at(logical_id: &str, message: impl Into<String>) -> Self {
        Self {
            logical_id: Some(logical_id.to_string()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.logical_id {
            Some(id) => write!(f, "{}: {}", id, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Parse a template file from disk.
pub fn parse_template_file(path: &Path) -> Result<Template> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CfnError::Io(format!("failed to read {}: {}", path.display(), e)))?;
    let template = parse_template(&content)
        .map_err(|e| CfnError::Parse(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(
        path = %path.display(),
        resources = template.resources.len(),
        "parsed template"
    );
    Ok(template)
}

/// Parse a YAML or JSON template from a string.
pub fn parse_template(text: &str) -> Result<Template> {
    let yaml: serde_yaml_ng::Value = serde_yaml_ng::from_str(text)?;
    if yaml.is_null() {
        return Err(CfnError::Parse("empty template".to_string()));
    }
    let json = yaml_to_json(yaml)?;
    Ok(serde_json::from_value(json)?)
}

/// Convert a YAML value to JSON, expanding short-form intrinsic tags.
pub fn yaml_to_json(value: serde_yaml_ng::Value) -> Result<serde_json::Value> {
    use serde_yaml_ng::Value as Yaml;

    Ok(match value {
        Yaml::Null => serde_json::Value::Null,
        Yaml::Bool(b) => serde_json::Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                serde_json::Value::from(i)
            } else if let Some(u) = n.as_u64() {
                serde_json::Value::from(u)
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| CfnError::Parse(format!("number {} has no JSON form", n)))?
            }
        }
        Yaml::String(s) => serde_json::Value::String(s),
        Yaml::Sequence(items) => serde_json::Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Mapping(map) => {
            let mut object = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let key = match k {
                    Yaml::String(s) => s,
                    Yaml::Number(n) => n.to_string(),
                    Yaml::Bool(b) => b.to_string(),
                    other => {
                        return Err(CfnError::Parse(format!(
                            "mapping keys must be scalars, got {:?}",
                            other
                        )))
                    }
                };
                object.insert(key, yaml_to_json(v)?);
            }
            serde_json::Value::Object(object)
        }
        Yaml::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let name = tag.trim_start_matches('!');
            expand_short_form(name, yaml_to_json(tagged.value)?)?
        }
    })
}

/// `!Name value` → `{"Fn::Name": value}` (`Ref` and `Condition` keep their name).
fn expand_short_form(name: &str, value: serde_json::Value) -> Result<serde_json::Value> {
    let key = match name {
        "Ref" | "Condition" => name.to_string(),
        "Base64" | "Cidr" | "FindInMap" | "GetAtt" | "GetAZs" | "ImportValue" | "Join"
        | "Select" | "Split" | "Sub" | "Transform" | "If" | "Equals" | "Not" | "And" | "Or" => {
            format!("Fn::{}", name)
        }
        other => return Err(CfnError::Parse(format!("unknown intrinsic tag !{}", other))),
    };
    let value = match (name, value) {
        // `!GetAtt Resource.Attribute` is shorthand for the list form
        ("GetAtt", serde_json::Value::String(dotted)) => match dotted.split_once('.') {
            Some((resource, attribute)) => serde_json::json!([resource, attribute]),
            None => serde_json::Value::String(dotted),
        },
        // A bare `!GetAZs` means the current region
        ("GetAZs", serde_json::Value::Null) => serde_json::Value::String(String::new()),
        (_, value) => value,
    };
    let mut object = serde_json::Map::new();
    object.insert(key, value);
    Ok(serde_json::Value::Object(object))
}

/// Validate a parsed template. Returns a list of errors (empty = valid).
pub fn validate_template(template: &Template, settings: &ValidateSettings) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // Format version
    match template.format_version.as_deref() {
        Some(TEMPLATE_FORMAT_VERSION) => {}
        Some(other) => errors.push(ValidationError::template(format!(
            "AWSTemplateFormatVersion must be \"{}\", got \"{}\"",
            TEMPLATE_FORMAT_VERSION, other
        ))),
        None if settings.require_format_version => errors.push(ValidationError::template(
            "AWSTemplateFormatVersion is missing",
        )),
        None => {}
    }

    if template.resources.is_empty() {
        errors.push(ValidationError::template("template declares no resources"));
    }

    // Logical ids
    let ids = template
        .parameters
        .keys()
        .chain(template.resources.keys())
        .chain(template.outputs.keys());
    for id in ids {
        if !is_valid_logical_id(id) {
            errors.push(ValidationError::at(
                id,
                "logical id must be 1-255 alphanumeric characters",
            ));
        }
    }
    for id in template.parameters.keys() {
        if template.resources.contains_key(id) {
            errors.push(ValidationError::at(
                id,
                "logical id is used by both a parameter and a resource",
            ));
        }
    }

    for (id, entry) in &template.resources {
        validate_resource(template, id, entry, settings, &mut errors);
    }

    for (id, output) in &template.outputs {
        check_condition(template, id, output.condition.as_deref(), &mut errors);
        for r in resolver::collect_references(&output.value) {
            check_reference(template, id, &r, &mut errors);
        }
    }

    // Cycles over known edges; unknown DependsOn targets were reported above
    let members = resolver::cycle_members(template);
    if !members.is_empty() {
        errors.push(ValidationError::template(format!(
            "dependency cycle detected involving: {}",
            members.join(", ")
        )));
    }

    tracing::debug!(errors = errors.len(), "validated template");
    errors
}

fn validate_resource(
    template: &Template,
    id: &str,
    entry: &ResourceEntry,
    settings: &ValidateSettings,
    errors: &mut Vec<ValidationError>,
) {
    // Type
    if !RESOURCE_TYPE.is_match(&entry.resource_type) {
        errors.push(ValidationError::at(
            id,
            format!(
                "Type '{}' must look like Service::Module::Name",
                entry.resource_type
            ),
        ));
    } else if !entry.is_glue() && !settings.allow_foreign_types {
        errors.push(ValidationError::at(
            id,
            format!("non-Glue type '{}' is not allowed", entry.resource_type),
        ));
    }

    // DependsOn references
    for dep in entry.depends_on.to_vec() {
        if dep == id {
            errors.push(ValidationError::at(id, "depends on itself"));
        } else if !template.resources.contains_key(&dep) {
            errors.push(ValidationError::at(
                id,
                format!("depends on unknown resource '{}'", dep),
            ));
        }
    }

    check_condition(template, id, entry.condition.as_deref(), errors);

    let Some(properties) = &entry.properties else {
        check_glue_properties(id, entry, errors);
        return;
    };
    if !properties.is_object() {
        errors.push(ValidationError::at(id, "Properties must be an object"));
        return;
    }

    for r in resolver::collect_references(properties) {
        check_reference(template, id, &r, errors);
    }
    for message in resolver::sub_errors(properties) {
        errors.push(ValidationError::at(id, message));
    }

    check_glue_properties(id, entry, errors);
}

/// Typed parse plus per-type checks for `AWS::Glue::*` entries.
fn check_glue_properties(id: &str, entry: &ResourceEntry, errors: &mut Vec<ValidationError>) {
    match GlueResource::from_entry(entry) {
        Ok(Some(resource)) => {
            for message in resource.validate() {
                errors.push(ValidationError::at(id, message));
            }
        }
        Ok(None) => {}
        Err(e) => errors.push(ValidationError::at(id, e.to_string())),
    }
}

fn check_condition(
    template: &Template,
    id: &str,
    condition: Option<&str>,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(name) = condition {
        if !template.conditions.contains_key(name) {
            errors.push(ValidationError::at(
                id,
                format!("references unknown condition '{}'", name),
            ));
        }
    }
}

fn check_reference(
    template: &Template,
    id: &str,
    reference: &Reference,
    errors: &mut Vec<ValidationError>,
) {
    let target = reference.target.as_str();
    let needs_resource = reference.kind == ReferenceKind::GetAtt || reference.attribute.is_some();

    if !needs_resource {
        let known = template.resources.contains_key(target)
            || template.parameters.contains_key(target)
            || PSEUDO_PARAMETERS.contains(&target);
        if !known {
            errors.push(ValidationError::at(
                id,
                format!("references unknown '{}'", target),
            ));
        }
        return;
    }

    let Some(entry) = template.resources.get(target) else {
        errors.push(ValidationError::at(
            id,
            format!("Fn::GetAtt targets unknown resource '{}'", target),
        ));
        return;
    };
    let Some(kind) = ResourceKind::from_type_name(&entry.resource_type) else {
        return;
    };
    match reference.attribute.as_deref() {
        Some(attribute) if kind.attributes().contains(&attribute) => {}
        Some(attribute) => errors.push(ValidationError::at(
            id,
            format!(
                "{} ({}) has no attribute '{}'",
                target,
                kind.type_name(),
                attribute
            ),
        )),
        None => errors.push(ValidationError::at(
            id,
            format!("Fn::GetAtt on '{}' names no attribute", target),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID: &str = r#"
AWSTemplateFormatVersion: "2010-09-09"
Parameters:
  ScriptBucket:
    Type: String
Resources:
  Registry:
    Type: AWS::Glue::Registry
    Properties:
      Name: events
  OrderSchema:
    Type: AWS::Glue::Schema
    Properties:
      Name: order
      DataFormat: AVRO
      Compatibility: BACKWARD
      SchemaDefinition: '{"type":"record","name":"Order","fields":[]}'
      Registry:
        Arn: !GetAtt Registry.Arn
  Etl:
    Type: AWS::Glue::Job
    DependsOn: OrderSchema
    Properties:
      Role: !Sub "arn:aws:iam::${AWS::AccountId}:role/etl"
      Command:
        Name: glueetl
        ScriptLocation: !Join ["", ["s3://", !Ref ScriptBucket, "/etl.py"]]
Outputs:
  SchemaArn:
    Value: !Ref OrderSchema
"#;

    fn settings() -> ValidateSettings {
        ValidateSettings::default()
    }

    fn messages(errors: &[ValidationError]) -> Vec<String> {
        errors.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_cg006_parse_valid() {
        let t = parse_template(VALID).unwrap();
        assert_eq!(t.resources.len(), 3);
        let errors = validate_template(&t, &settings());
        assert!(errors.is_empty(), "unexpected errors: {:?}", messages(&errors));
    }

    #[test]
    fn test_cg006_short_form_expansion() {
        let t = parse_template(VALID).unwrap();
        let schema = t.resources["OrderSchema"].properties.as_ref().unwrap();
        assert_eq!(schema["Registry"]["Arn"], json!({"Fn::GetAtt": ["Registry", "Arn"]}));
        let job = t.resources["Etl"].properties.as_ref().unwrap();
        assert_eq!(
            job["Command"]["ScriptLocation"],
            json!({"Fn::Join": ["", ["s3://", {"Ref": "ScriptBucket"}, "/etl.py"]]})
        );
        assert_eq!(
            job["Role"],
            json!({"Fn::Sub": "arn:aws:iam::${AWS::AccountId}:role/etl"})
        );
        assert_eq!(t.resources["Etl"].depends_on.to_vec(), vec!["OrderSchema"]);
    }

    #[test]
    fn test_cg006_short_form_conditions() {
        let t = parse_template(
            r#"
Conditions:
  IsProd: !Equals [!Ref Env, prod]
  NotProd: !Not [!Condition IsProd]
Resources:
  W:
    Type: AWS::Glue::Workflow
    Properties:
      Name: !If [IsProd, prod-flow, !Ref "AWS::NoValue"]
      Description: !Select [0, !GetAZs ]
"#,
        )
        .unwrap();
        assert_eq!(
            t.conditions["IsProd"],
            json!({"Fn::Equals": [{"Ref": "Env"}, "prod"]})
        );
        assert_eq!(
            t.conditions["NotProd"],
            json!({"Fn::Not": [{"Condition": "IsProd"}]})
        );
        let props = t.resources["W"].properties.as_ref().unwrap();
        assert_eq!(props["Description"], json!({"Fn::Select": [0, {"Fn::GetAZs": ""}]}));
    }

    #[test]
    fn test_cg006_unknown_tag() {
        let err = parse_template("Resources: !Bogus x").unwrap_err();
        assert!(err.to_string().contains("!Bogus"));
    }

    #[test]
    fn test_cg006_parse_json() {
        let t = parse_template(
            r#"{"Resources": {"W": {"Type": "AWS::Glue::Workflow", "Properties": {"Name": "w"}}}}"#,
        )
        .unwrap();
        assert_eq!(t.resources["W"].resource_type, "AWS::Glue::Workflow");
        assert!(t.format_version.is_none());
    }

    #[test]
    fn test_cg006_parse_invalid() {
        assert!(parse_template("not: [valid: yaml: {{").is_err());
        assert!(parse_template("").is_err());
        assert!(parse_template("Resources: {W: {Properties: {}}}").is_err());
    }

    #[test]
    fn test_cg006_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.yaml");
        std::fs::write(&path, VALID).unwrap();
        let t = parse_template_file(&path).unwrap();
        assert!(t.resources.contains_key("Etl"));
        let err = parse_template_file(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, CfnError::Io(_)));
    }

    #[test]
    fn test_cg006_bad_version_and_empty() {
        let t = parse_template("AWSTemplateFormatVersion: '2011-01-01'\nResources: {}").unwrap();
        let errors = messages(&validate_template(&t, &settings()));
        assert!(errors.iter().any(|e| e.contains("AWSTemplateFormatVersion")));
        assert!(errors.iter().any(|e| e.contains("no resources")));
    }

    #[test]
    fn test_cg006_require_format_version() {
        let t = parse_template("Resources: {W: {Type: 'AWS::Glue::Workflow'}}").unwrap();
        assert!(validate_template(&t, &settings()).is_empty());
        let strict = ValidateSettings {
            require_format_version: true,
            ..settings()
        };
        let errors = validate_template(&t, &strict);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("missing"));
    }

    #[test]
    fn test_cg006_bad_logical_id() {
        let t = parse_template("Resources: {my-flow: {Type: 'AWS::Glue::Workflow'}}").unwrap();
        let errors = validate_template(&t, &settings());
        assert_eq!(errors[0].logical_id.as_deref(), Some("my-flow"));
        assert!(errors[0].message.contains("alphanumeric"));
    }

    #[test]
    fn test_cg006_depends_on_checks() {
        let t = parse_template(
            r#"
Resources:
  A:
    Type: AWS::Glue::Workflow
    DependsOn: [A, Ghost]
"#,
        )
        .unwrap();
        let errors = messages(&validate_template(&t, &settings()));
        assert!(errors.contains(&"A: depends on itself".to_string()));
        assert!(errors.contains(&"A: depends on unknown resource 'Ghost'".to_string()));
    }

    #[test]
    fn test_cg006_reference_checks() {
        let t = parse_template(
            r#"
Resources:
  Reg:
    Type: AWS::Glue::Registry
    Properties:
      Name: !Ref Missing
      Description: !Sub "${W.Nope} in ${AWS::Region}"
  W:
    Type: AWS::Glue::Workflow
    Condition: Ghost
    Properties:
      Name: !GetAtt Param.Arn
      Description: !Sub "${Unclosed"
Parameters:
  Param:
    Type: String
"#,
        )
        .unwrap();
        let errors = messages(&validate_template(&t, &settings()));
        assert!(errors.contains(&"Reg: references unknown 'Missing'".to_string()), "{:?}", errors);
        assert!(errors.iter().any(|e| e.contains("has no attribute 'Nope'")));
        assert!(errors.contains(&"W: references unknown condition 'Ghost'".to_string()));
        assert!(errors.iter().any(|e| e.contains("targets unknown resource 'Param'")));
        assert!(errors.iter().any(|e| e.starts_with("W: ") && e.contains("unclosed")));
        assert_eq!(errors.len(), 5, "{:?}", errors);
    }

    #[test]
    fn test_cg006_foreign_types() {
        let text = r#"
Resources:
  Bucket:
    Type: AWS::S3::Bucket
  Broken:
    Type: NotAType
"#;
        let t = parse_template(text).unwrap();
        let errors = validate_template(&t, &settings());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Service::Module::Name"));

        let strict = ValidateSettings {
            allow_foreign_types: false,
            ..settings()
        };
        let errors = messages(&validate_template(&t, &strict));
        assert!(errors.iter().any(|e| e.contains("non-Glue type 'AWS::S3::Bucket'")));
    }

    #[test]
    fn test_cg006_glue_typed_checks() {
        let t = parse_template(
            r#"
Resources:
  Trig:
    Type: AWS::Glue::Trigger
    Properties:
      Type: SCHEDULED
      Actions: [{JobName: nightly}]
  Part:
    Type: AWS::Glue::Partition
    Properties:
      CatalogId: "123"
  Unknown:
    Type: AWS::Glue::Blueprint
"#,
        )
        .unwrap();
        let errors = messages(&validate_template(&t, &settings()));
        assert!(errors.contains(&"Trig: Schedule is required for SCHEDULED triggers".to_string()));
        assert!(errors.iter().any(|e| e.starts_with("Part: ") && e.contains("missing field")));
        assert!(errors.iter().any(|e| e.contains("unsupported Glue resource type: AWS::Glue::Blueprint")));
    }

    #[test]
    fn test_cg006_intrinsic_enums_not_checked() {
        let t = parse_template(
            r#"
Parameters:
  TriggerType: {Type: String}
Resources:
  Trig:
    Type: AWS::Glue::Trigger
    Properties:
      Type: !Ref TriggerType
      Actions: [{CrawlerName: c}]
"#,
        )
        .unwrap();
        assert!(validate_template(&t, &settings()).is_empty());
    }

    #[test]
    fn test_cg006_cycle_reported() {
        let t = parse_template(
            r#"
Resources:
  A:
    Type: AWS::Glue::Workflow
    Properties: {Name: !Ref B}
  B:
    Type: AWS::Glue::Workflow
    DependsOn: A
"#,
        )
        .unwrap();
        let errors = messages(&validate_template(&t, &settings()));
        assert_eq!(errors, vec!["dependency cycle detected involving: A, B"]);
    }

    #[test]
    fn test_cg006_cycle_reported_with_unknown_depends_on() {
        let t = parse_template(
            r#"
Resources:
  A:
    Type: AWS::Glue::Workflow
    DependsOn: [B, Ghost]
  B:
    Type: AWS::Glue::Workflow
    Properties: {Name: !Ref A}
"#,
        )
        .unwrap();
        let errors = messages(&validate_template(&t, &settings()));
        assert_eq!(
            errors,
            vec![
                "A: depends on unknown resource 'Ghost'",
                "dependency cycle detected involving: A, B",
            ]
        );
    }

    #[test]
    fn test_cg006_unknown_properties_rejected() {
        let t = parse_template(
            r#"
Resources:
  Etl:
    Type: AWS::Glue::Job
    Properties:
      Role: etl-role
      Command: {Name: glueetl, ScriptLocation: s3://b/etl.py}
      WorkerTyp: G.1X
      NumberOfWorkerz: 2
  Crawl:
    Type: AWS::Glue::Crawler
    Properties:
      Role: crawler-role
      Targets:
        S3Targets:
          - {Path: s3://b/raw/, Exclusionz: ["*.tmp"]}
"#,
        )
        .unwrap();
        let errors = messages(&validate_template(&t, &settings()));
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Etl: ") && errors[0].contains("unknown field `WorkerTyp`"));
        assert!(errors[1].starts_with("Crawl: "));
        assert!(errors[1].contains("Targets.S3Targets[0]"));
        assert!(errors[1].contains("unknown field `Exclusionz`"));
    }

    #[test]
    fn test_cg006_intrinsic_tags_and_conditional_values() {
        let t = parse_template(
            r#"
Parameters:
  Env: {Type: String}
Conditions:
  Prod: !Equals [!Ref Env, prod]
Resources:
  Flow:
    Type: AWS::Glue::Workflow
    Properties:
      Name: nightly
      Description: !If [Prod, big, small]
      MaxConcurrentRuns: !If [Prod, 4, !Ref "AWS::NoValue"]
  Crawl:
    Type: AWS::Glue::Crawler
    Properties:
      Role: crawler-role
      Targets:
        S3Targets: [{Path: s3://b/raw/}]
      Tags:
        env: !Ref Env
        team: data
"#,
        )
        .unwrap();
        assert!(validate_template(&t, &settings()).is_empty());

        let normalized = crate::core::synth::normalize(&t).unwrap();
        let flow = normalized.resources["Flow"].properties.as_ref().unwrap();
        assert_eq!(flow["Description"], json!({"Fn::If": ["Prod", "big", "small"]}));
        assert_eq!(
            flow["MaxConcurrentRuns"],
            json!({"Fn::If": ["Prod", 4, {"Ref": "AWS::NoValue"}]})
        );
        let crawl = normalized.resources["Crawl"].properties.as_ref().unwrap();
        assert_eq!(crawl["Tags"], json!({"env": {"Ref": "Env"}, "team": "data"}));
    }

    #[test]
    fn test_cg006_output_references() {
        let t = parse_template(
            r#"
Resources:
  Reg: {Type: 'AWS::Glue::Registry', Properties: {Name: r}}
Outputs:
  Good: {Value: !GetAtt Reg.Arn}
  Bad: {Value: !GetAtt Reg.Id}
"#,
        )
        .unwrap();
        let errors = validate_template(&t, &settings());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].logical_id.as_deref(), Some("Bad"));
    }
}
