//! CG-003: Reference extraction and dependency DAG construction.
//!
//! Finds `Ref`, `Fn::GetAtt` and `Fn::Sub` references inside property values.
//! Builds a DAG from explicit `DependsOn` plus implicit references and computes
//! deployment order using Kahn's algorithm with deterministic (alphabetical)
//! tie-breaking.

use super::error::{CfnError, Result};
use super::types::Template;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// How a reference was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Ref,
    GetAtt,
    Sub,
}

/// One reference to a logical id, parameter, or pseudo parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub target: String,
    /// Set for `Fn::GetAtt` and `${X.Attr}` placeholders
    pub attribute: Option<String>,
}

impl Reference {
    fn new(kind: ReferenceKind, target: &str, attribute: Option<&str>) -> Self {
        Self {
            kind,
            target: target.to_string(),
            attribute: attribute.map(str::to_string),
        }
    }
}

/// Variable names inside an `Fn::Sub` template string.
///
/// `${X}` and `${X.Attr}` are placeholders; `${!Literal}` is an escape and is
/// skipped.
pub fn sub_placeholders(template: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut start = 0;

    while let Some(open) = template[start..].find("${") {
        let open = start + open;
        let close = template[open..].find('}').ok_or_else(|| {
            CfnError::Template(format!("unclosed Fn::Sub placeholder at position {}", open))
        })?;
        let close = open + close;
        let name = template[open + 2..close].trim();

        if !name.starts_with('!') {
            if name.is_empty() {
                return Err(CfnError::Template(format!(
                    "empty Fn::Sub placeholder at position {}",
                    open
                )));
            }
            names.push(name.to_string());
        }
        start = close + 1;
    }

    Ok(names)
}

/// Walk a property value and collect every reference it makes.
///
/// Malformed `Fn::Sub` strings contribute nothing here; [`sub_errors`]
/// reports them.
pub fn collect_references(value: &serde_json::Value) -> Vec<Reference> {
    let mut refs = Vec::new();
    walk(value, &mut refs);
    refs
}

fn walk(value: &serde_json::Value, refs: &mut Vec<Reference>) {
    match value {
        serde_json::Value::Object(map) if map.len() == 1 => {
            for (key, arg) in map {
                match (key.as_str(), arg) {
                    ("Ref", serde_json::Value::String(target)) => {
                        refs.push(Reference::new(ReferenceKind::Ref, target, None));
                    }
                    ("Fn::GetAtt", _) => get_att_reference(arg, refs),
                    ("Fn::Sub", serde_json::Value::String(s)) => {
                        sub_references(s, &[], refs);
                    }
                    ("Fn::Sub", serde_json::Value::Array(items)) => {
                        if let Some(serde_json::Value::String(s)) = items.first() {
                            let shadowed: Vec<&str> = match items.get(1) {
                                Some(serde_json::Value::Object(vars)) => {
                                    vars.keys().map(String::as_str).collect()
                                }
                                _ => Vec::new(),
                            };
                            sub_references(s, &shadowed, refs);
                        }
                        for item in items.iter().skip(1) {
                            walk(item, refs);
                        }
                    }
                    _ => walk(arg, refs),
                }
            }
        }
        serde_json::Value::Object(map) => {
            for v in map.values() {
                walk(v, refs);
            }
        }
        serde_json::Value::Array(items) => {
            for v in items {
                walk(v, refs);
            }
        }
        _ => {}
    }
}

fn get_att_reference(arg: &serde_json::Value, refs: &mut Vec<Reference>) {
    match arg {
        serde_json::Value::Array(items) => {
            if let Some(serde_json::Value::String(target)) = items.first() {
                let attribute = items.get(1).and_then(serde_json::Value::as_str);
                refs.push(Reference::new(ReferenceKind::GetAtt, target, attribute));
            }
            for item in items.iter().skip(1) {
                walk(item, refs);
            }
        }
        serde_json::Value::String(dotted) => {
            let (target, attribute) = match dotted.split_once('.') {
                Some((t, a)) => (t, Some(a)),
                None => (dotted.as_str(), None),
            };
            refs.push(Reference::new(ReferenceKind::GetAtt, target, attribute));
        }
        _ => {}
    }
}

fn sub_references(template: &str, shadowed: &[&str], refs: &mut Vec<Reference>) {
    let Ok(names) = sub_placeholders(template) else {
        return;
    };
    for name in names {
        if shadowed.contains(&name.as_str()) {
            continue;
        }
        // Pseudo parameters contain "::" and never an attribute
        let reference = match name.split_once('.') {
            Some((target, attribute)) if !target.contains("::") => {
                Reference::new(ReferenceKind::Sub, target, Some(attribute))
            }
            _ => Reference::new(ReferenceKind::Sub, &name, None),
        };
        refs.push(reference);
    }
}

/// Parse errors for every `Fn::Sub` template string inside `value`.
pub fn sub_errors(value: &serde_json::Value) -> Vec<String> {
    let mut errors = Vec::new();
    collect_sub_errors(value, &mut errors);
    errors
}

fn collect_sub_errors(value: &serde_json::Value, errors: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, v) in map {
                let template = match (key.as_str(), v) {
                    ("Fn::Sub", serde_json::Value::String(s)) => Some(s),
                    ("Fn::Sub", serde_json::Value::Array(items)) => {
                        items.first().and_then(|first| match first {
                            serde_json::Value::String(s) => Some(s),
                            _ => None,
                        })
                    }
                    _ => None,
                };
                if let Some(Err(e)) = template.map(|s| sub_placeholders(s)) {
                    errors.push(e.to_string());
                }
                collect_sub_errors(v, errors);
            }
        }
        serde_json::Value::Array(items) => {
            for v in items {
                collect_sub_errors(v, errors);
            }
        }
        _ => {}
    }
}

/// Per resource: the other resources it must be created after.
///
/// Explicit `DependsOn` plus every `Ref`/`GetAtt`/`Sub` reference in its
/// properties that names a resource. Parameters and pseudo parameters are
/// not edges.
pub fn resource_dependencies(template: &Template) -> IndexMap<String, BTreeSet<String>> {
    template
        .resources
        .iter()
        .map(|(id, entry)| {
            let mut deps: BTreeSet<String> = entry.depends_on.to_vec().into_iter().collect();
            if let Some(props) = &entry.properties {
                for r in collect_references(props) {
                    if template.resources.contains_key(&r.target) {
                        deps.insert(r.target);
                    }
                }
            }
            (id.clone(), deps)
        })
        .collect()
}

/// Build a topological deployment order from resource dependencies.
/// Uses Kahn's algorithm with alphabetical tie-breaking for determinism.
pub fn build_deployment_order(template: &Template) -> Result<Vec<String>> {
    let dependencies = resource_dependencies(template);
    for (id, deps) in &dependencies {
        if let Some(dep) = deps.iter().find(|d| !dependencies.contains_key(*d)) {
            return Err(CfnError::Template(format!(
                "resource '{}' depends on unknown '{}'",
                id, dep
            )));
        }
    }

    let order = topological_order(&dependencies).map_err(CfnError::Cycle)?;
    tracing::debug!(resources = order.len(), "computed deployment order");
    Ok(order)
}

/// Resources caught in a dependency cycle, sorted; empty for a DAG.
///
/// Edges to unknown resources are ignored, so a template with both an
/// unknown `DependsOn` and a cycle reports the cycle too.
pub fn cycle_members(template: &Template) -> Vec<String> {
    let mut dependencies = resource_dependencies(template);
    let known: BTreeSet<String> = dependencies.keys().cloned().collect();
    for deps in dependencies.values_mut() {
        deps.retain(|d| known.contains(d));
    }
    topological_order(&dependencies).err().unwrap_or_default()
}

/// Kahn's algorithm over a closed graph. `Err` carries the sorted members
/// left with unresolved dependencies.
fn topological_order(
    dependencies: &IndexMap<String, BTreeSet<String>>,
) -> std::result::Result<Vec<String>, Vec<String>> {
    let mut in_degree: HashMap<&str, usize> = HashMap::new();
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();

    // Initialize
    for id in dependencies.keys() {
        in_degree.insert(id.as_str(), 0);
        adjacency.insert(id.as_str(), Vec::new());
    }

    // Build edges from dependency to dependent
    for (id, deps) in dependencies {
        for dep in deps {
            if let Some(dependents) = adjacency.get_mut(dep.as_str()) {
                dependents.push(id.as_str());
                *in_degree.entry(id.as_str()).or_insert(0) += 1;
            }
        }
    }

    // Sorted tie-breaking
    let mut zero_degree: Vec<&str> = in_degree
        .iter()
        .filter(|(_, &d)| d == 0)
        .map(|(id, _)| *id)
        .collect();
    zero_degree.sort_unstable();
    let mut queue: VecDeque<&str> = zero_degree.into_iter().collect();

    let mut order = Vec::with_capacity(dependencies.len());
    while let Some(current) = queue.pop_front() {
        order.push(current.to_string());

        let mut next_ready: Vec<&str> = Vec::new();
        for neighbor in adjacency.get(current).into_iter().flatten() {
            if let Some(degree) = in_degree.get_mut(neighbor) {
                *degree -= 1;
                if *degree == 0 {
                    next_ready.push(neighbor);
                }
            }
        }
        next_ready.sort_unstable();
        queue.extend(next_ready);
    }

    if order.len() != dependencies.len() {
        let mut cycle_members: Vec<String> = in_degree
            .iter()
            .filter(|(_, &d)| d > 0)
            .map(|(id, _)| id.to_string())
            .collect();
        cycle_members.sort();
        return Err(cycle_members);
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ResourceEntry;
    use proptest::prelude::*;
    use serde_json::json;

    fn template(entries: &[(&str, serde_json::Value, &[&str])]) -> Template {
        let mut t = Template::new();
        for (id, props, deps) in entries {
            let entry = t
                .add_entry(id, ResourceEntry::new("AWS::Glue::Workflow", props.clone()))
                .unwrap();
            for d in deps.iter() {
                entry.depend_on(*d);
            }
        }
        t
    }

    #[test]
    fn test_cg003_sub_placeholders() {
        let names = sub_placeholders("s3://${Bucket}/${AWS::Region}/${Job.Arn}").unwrap();
        assert_eq!(names, vec!["Bucket", "AWS::Region", "Job.Arn"]);
    }

    #[test]
    fn test_cg003_sub_escape_and_unclosed() {
        assert_eq!(sub_placeholders("${!Literal}-${Name}").unwrap(), vec!["Name"]);
        assert!(sub_placeholders("plain text").unwrap().is_empty());
        let err = sub_placeholders("prefix-${Oops").unwrap_err();
        assert!(err.to_string().contains("unclosed"));
        assert!(sub_placeholders("${}").is_err());
    }

    #[test]
    fn test_cg003_collect_references() {
        let props = json!({
            "Role": {"Fn::GetAtt": ["EtlRole", "Arn"]},
            "Name": {"Fn::Sub": "${AWS::StackName}-${Prefix}"},
            "DatabaseName": {"Ref": "Db"},
            "Command": {"ScriptLocation": {"Fn::GetAtt": "Bucket.Arn"}},
            "Tags": {"owner": "data"}
        });
        let refs = collect_references(&props);
        let targets: Vec<(&str, ReferenceKind)> =
            refs.iter().map(|r| (r.target.as_str(), r.kind)).collect();
        assert_eq!(
            targets,
            vec![
                ("EtlRole", ReferenceKind::GetAtt),
                ("AWS::StackName", ReferenceKind::Sub),
                ("Prefix", ReferenceKind::Sub),
                ("Db", ReferenceKind::Ref),
                ("Bucket", ReferenceKind::GetAtt),
            ]
        );
        assert_eq!(refs[4].attribute.as_deref(), Some("Arn"));
    }

    #[test]
    fn test_cg003_sub_variables_shadow() {
        let props = json!({"Fn::Sub": ["${Name}-${Env}", {"Name": {"Ref": "JobName"}}]});
        let refs = collect_references(&props);
        let targets: Vec<&str> = refs.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(targets, vec!["Env", "JobName"]);
    }

    #[test]
    fn test_cg003_sub_errors() {
        let props = json!({"A": {"Fn::Sub": "${Bad"}, "B": [{"Fn::Sub": ["${Ok}", {}]}]});
        let errors = sub_errors(&props);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unclosed"));
    }

    #[test]
    fn test_cg003_topo_linear() {
        let t = template(&[
            ("C", json!({"Name": {"Ref": "B"}}), &[]),
            ("B", json!({}), &["A"]),
            ("A", json!({}), &[]),
        ]);
        assert_eq!(build_deployment_order(&t).unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_cg003_topo_parallel() {
        let t = template(&[("beta", json!({}), &[]), ("alpha", json!({}), &[])]);
        // Alphabetical tie-breaking: alpha before beta
        assert_eq!(build_deployment_order(&t).unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_cg003_topo_diamond() {
        let t = template(&[
            ("Bottom", json!({"A": {"Fn::Sub": "${Left}/${Right.Arn}"}}), &[]),
            ("Left", json!({}), &["Top"]),
            ("Right", json!({"A": {"Fn::GetAtt": ["Top", "Id"]}}), &[]),
            ("Top", json!({}), &[]),
        ]);
        let order = build_deployment_order(&t).unwrap();
        assert_eq!(order, vec!["Top", "Left", "Right", "Bottom"]);
    }

    #[test]
    fn test_cg003_parameters_are_not_edges() {
        let mut t = template(&[("Job", json!({"Role": {"Ref": "RoleArn"}}), &[])]);
        t.add_parameter("RoleArn", crate::core::types::Parameter::string())
            .unwrap();
        let deps = resource_dependencies(&t);
        assert!(deps["Job"].is_empty());
    }

    #[test]
    fn test_cg003_topo_cycle() {
        let t = template(&[
            ("A", json!({"X": {"Ref": "B"}}), &[]),
            ("B", json!({}), &["A"]),
            ("C", json!({}), &[]),
        ]);
        let err = build_deployment_order(&t).unwrap_err();
        match err {
            CfnError::Cycle(members) => assert_eq!(members, vec!["A", "B"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_cg003_unknown_depends_on() {
        let t = template(&[("A", json!({}), &["Ghost"])]);
        let err = build_deployment_order(&t).unwrap_err();
        assert!(err.to_string().contains("unknown 'Ghost'"));
        assert!(cycle_members(&t).is_empty());
    }

    #[test]
    fn test_cg003_cycle_members_ignore_unknown_edges() {
        let t = template(&[
            ("A", json!({}), &["B", "Ghost"]),
            ("B", json!({"X": {"Ref": "A"}}), &[]),
            ("C", json!({}), &["A"]),
        ]);
        assert!(matches!(build_deployment_order(&t), Err(CfnError::Template(_))));
        assert_eq!(cycle_members(&t), vec!["A", "B", "C"]);

        let dag = template(&[("A", json!({}), &["Ghost"]), ("B", json!({}), &["A"])]);
        assert!(cycle_members(&dag).is_empty());
    }

    proptest! {
        /// Edges only point from lower to higher index, so the graph is a DAG
        /// and every edge must be honored by the order.
        #[test]
        fn test_cg003_prop_order_respects_edges(
            n in 1usize..12,
            raw_edges in proptest::collection::vec((0usize..12, 0usize..12), 0..30),
        ) {
            let ids: Vec<String> = (0..n).map(|i| format!("R{:02}", i)).collect();
            let mut t = Template::new();
            for id in &ids {
                t.add_entry(id, ResourceEntry::new("AWS::Glue::Workflow", json!({}))).unwrap();
            }
            let edges: Vec<(usize, usize)> = raw_edges
                .into_iter()
                .filter(|(a, b)| a < b && *b < n)
                .collect();
            for (dep, dependent) in &edges {
                if let Some(entry) = t.resources.get_mut(&ids[*dependent]) {
                    entry.depend_on(ids[*dep].clone());
                }
            }

            let order = build_deployment_order(&t).unwrap();
            prop_assert_eq!(order.len(), n);
            let position: HashMap<&str, usize> =
                order.iter().enumerate().map(|(i, id)| (id.as_str(), i)).collect();
            for (dep, dependent) in &edges {
                prop_assert!(position[ids[*dep].as_str()] < position[ids[*dependent].as_str()]);
            }
        }

        #[test]
        fn test_cg003_prop_placeholders_without_dollar(s in "[A-Za-z0-9 ./:-]{0,40}") {
            prop_assert!(sub_placeholders(&s).unwrap().is_empty());
        }
    }
}
