//! CG-007: Template output: rendering, normalization, atomic writes.

use super::config::OutputFormat;
use super::error::{CfnError, Result};
use super::types::Template;
use crate::glue::GlueResource;
use std::path::Path;

/// Render a template as pretty JSON or YAML, with a trailing newline.
pub fn render(template: &Template, format: OutputFormat) -> Result<String> {
    let mut text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(template)
            .map_err(|e| CfnError::Render(format!("JSON: {}", e)))?,
        OutputFormat::Yaml => serde_yaml_ng::to_string(template)
            .map_err(|e| CfnError::Render(format!("YAML: {}", e)))?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// Re-render every `AWS::Glue::*` entry through its typed model.
///
/// Properties come out in model order. Fails on entries that do not parse,
/// including unknown property names. Non-Glue entries pass through unchanged.
pub fn normalize(template: &Template) -> Result<Template> {
    let mut out = template.clone();
    let mut rewritten = 0usize;
    for (id, entry) in out.resources.iter_mut() {
        let Some(resource) = GlueResource::from_entry(entry)
            .map_err(|e| CfnError::Template(format!("{}: {}", id, e)))?
        else {
            continue;
        };
        entry.properties = Some(resource.render_properties()?);
        rewritten += 1;
    }
    tracing::debug!(rewritten, "normalized Glue resources");
    Ok(out)
}

/// Write a rendered template atomically (write to temp, then rename).
pub fn write_template(path: &Path, template: &Template, format: OutputFormat) -> Result<()> {
    let text = render(template, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| CfnError::Io(format!("cannot create {}: {}", parent.display(), e)))?;
    }

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);
    std::fs::write(&tmp_path, &text)
        .map_err(|e| CfnError::Io(format!("cannot write {}: {}", tmp_path.display(), e)))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        CfnError::Io(format!(
            "cannot rename {} to {}: {}",
            tmp_path.display(),
            path.display(),
            e
        ))
    })?;

    tracing::info!(path = %path.display(), ?format, bytes = text.len(), "wrote template");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser;
    use crate::core::types::{Output, ResourceEntry, Value};
    use crate::glue::{Registry, Workflow};
    use serde_json::json;

    fn make_template() -> Template {
        let mut t = Template::new().with_description("schemas");
        t.add_resource("Reg", Registry::new("events")).unwrap();
        t.add_entry("Bucket", ResourceEntry::new("AWS::S3::Bucket", json!({"Zeta": 1, "Alpha": 2})))
            .unwrap();
        t.add_output("RegArn", Output::new(&Value::<String>::get_att("Reg", "Arn")).unwrap())
            .unwrap();
        t
    }

    #[test]
    fn test_cg007_render_json() {
        let text = render(&make_template(), OutputFormat::Json).unwrap();
        assert!(text.ends_with('\n'));
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(v["Resources"]["Reg"]["Type"], "AWS::Glue::Registry");
        assert_eq!(v["Resources"]["Reg"]["Properties"], json!({"Name": "events"}));
        assert_eq!(
            v["Outputs"]["RegArn"]["Value"],
            json!({"Fn::GetAtt": ["Reg", "Arn"]})
        );
        // Declaration order survives rendering
        let reg = text.find("\"Reg\"").unwrap();
        let bucket = text.find("\"Bucket\"").unwrap();
        assert!(reg < bucket);
    }

    #[test]
    fn test_cg007_render_yaml_reparses() {
        let t = make_template();
        let text = render(&t, OutputFormat::Yaml).unwrap();
        assert!(text.contains("AWS::Glue::Registry"));
        let back = parser::parse_template(&text).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_cg007_normalize() {
        let mut t = Template::new();
        t.add_entry(
            "Flow",
            ResourceEntry::new(
                "AWS::Glue::Workflow",
                json!({"Name": "etl", "MaxConcurrentRuns": 2, "Description": "d"}),
            ),
        )
        .unwrap();
        t.add_entry("Bucket", ResourceEntry::new("AWS::S3::Bucket", json!({"Zeta": 1})))
            .unwrap();
        let n = normalize(&t).unwrap();
        let expected = Workflow {
            name: Some("etl".into()),
            description: Some("d".into()),
            max_concurrent_runs: Some(Value::Literal(2)),
            ..Default::default()
        };
        assert_eq!(
            n.resources["Flow"].properties,
            Some(GlueResource::from(expected).render_properties().unwrap())
        );
        assert_eq!(n.resources["Bucket"], t.resources["Bucket"]);
    }

    #[test]
    fn test_cg007_normalize_rejects_bad_entry() {
        let mut t = Template::new();
        t.add_entry("Reg", ResourceEntry::new("AWS::Glue::Registry", json!({})))
            .unwrap();
        let err = normalize(&t).unwrap_err();
        assert!(err.to_string().contains("Reg: "));
    }

    #[test]
    fn test_cg007_normalize_rejects_unknown_property() {
        let mut t = Template::new();
        t.add_entry(
            "Flow",
            ResourceEntry::new("AWS::Glue::Workflow", json!({"Name": "etl", "MaxConcurentRuns": 2})),
        )
        .unwrap();
        let err = normalize(&t).unwrap_err().to_string();
        assert!(err.contains("Flow: "));
        assert!(err.contains("unknown field `MaxConcurentRuns`"));
    }

    #[test]
    fn test_cg007_write_template_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("template.json");
        write_template(&path, &make_template(), OutputFormat::Json).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("out").join("template.json.tmp").exists());
        let back = parser::parse_template_file(&path).unwrap();
        assert_eq!(back, make_template());
    }
}
