//! CG-004: Change-set generation: diff a new template against the deployed one.

use super::error::Result;
use super::hasher;
use super::resolver;
use super::types::{ResourceEntry, Template};
use crate::glue::ResourceKind;
use std::collections::BTreeSet;
use std::fmt;

/// What deploying the new template does to one logical id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction {
    Create,
    Update,
    /// Type changed, or a create-only property changed
    Replace,
    Delete,
    NoOp,
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => write!(f, "CREATE"),
            Self::Update => write!(f, "UPDATE"),
            Self::Replace => write!(f, "REPLACE"),
            Self::Delete => write!(f, "DELETE"),
            Self::NoOp => write!(f, "NO-OP"),
        }
    }
}

/// A single planned change.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChange {
    pub logical_id: String,

    /// Type in the new template (old template for deletions)
    pub resource_type: String,

    pub action: PlanAction,

    /// Top-level property names whose value differs
    pub changed_properties: Vec<String>,

    /// Human-readable description
    pub description: String,
}

/// Full change set.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSet {
    /// Creates/updates/no-ops in deployment order, then deletions
    pub changes: Vec<PlannedChange>,

    /// Deployment order of the new template
    pub deployment_order: Vec<String>,

    /// Summary counts
    pub to_create: u32,
    pub to_update: u32,
    pub to_replace: u32,
    pub to_delete: u32,
    pub unchanged: u32,
}

impl ChangeSet {
    pub fn has_changes(&self) -> bool {
        self.to_create + self.to_update + self.to_replace + self.to_delete > 0
    }
}

/// Diff `new` against `old`. Fails only when `new` cannot be ordered.
pub fn plan(old: &Template, new: &Template) -> Result<ChangeSet> {
    let deployment_order = resolver::build_deployment_order(new)?;
    let mut changes = Vec::new();
    let mut to_create = 0u32;
    let mut to_update = 0u32;
    let mut to_replace = 0u32;
    let mut to_delete = 0u32;
    let mut unchanged = 0u32;

    for logical_id in &deployment_order {
        let Some(entry) = new.resources.get(logical_id) else {
            continue;
        };
        let (action, changed_properties) = determine_action(old.resources.get(logical_id), entry);

        match action {
            PlanAction::Create => to_create += 1,
            PlanAction::Update => to_update += 1,
            PlanAction::Replace => to_replace += 1,
            PlanAction::Delete => to_delete += 1,
            PlanAction::NoOp => unchanged += 1,
        }

        changes.push(PlannedChange {
            logical_id: logical_id.clone(),
            resource_type: entry.resource_type.clone(),
            description: describe_action(logical_id, entry, action, &changed_properties),
            action,
            changed_properties,
        });
    }

    for (logical_id, entry) in &old.resources {
        if new.resources.contains_key(logical_id) {
            continue;
        }
        to_delete += 1;
        changes.push(PlannedChange {
            logical_id: logical_id.clone(),
            resource_type: entry.resource_type.clone(),
            description: describe_action(logical_id, entry, PlanAction::Delete, &[]),
            action: PlanAction::Delete,
            changed_properties: Vec::new(),
        });
    }

    tracing::info!(
        create = to_create,
        update = to_update,
        replace = to_replace,
        delete = to_delete,
        unchanged,
        "change set computed"
    );

    Ok(ChangeSet {
        changes,
        deployment_order,
        to_create,
        to_update,
        to_replace,
        to_delete,
        unchanged,
    })
}

/// Classify one logical id present in the new template.
fn determine_action(old: Option<&ResourceEntry>, new: &ResourceEntry) -> (PlanAction, Vec<String>) {
    let Some(old) = old else {
        return (PlanAction::Create, Vec::new());
    };
    if old.resource_type != new.resource_type {
        return (PlanAction::Replace, vec!["Type".to_string()]);
    }
    if hasher::hash_entry(old) == hasher::hash_entry(new) {
        return (PlanAction::NoOp, Vec::new());
    }

    let changed = changed_properties(old.properties.as_ref(), new.properties.as_ref());
    let replaces = ResourceKind::from_type_name(&new.resource_type).is_some_and(|kind| {
        changed
            .iter()
            .any(|p| kind.replacement_properties().contains(&p.as_str()))
    });
    if replaces {
        (PlanAction::Replace, changed)
    } else {
        (PlanAction::Update, changed)
    }
}

/// Top-level property names added, removed, or changed, sorted.
pub fn changed_properties(
    old: Option<&serde_json::Value>,
    new: Option<&serde_json::Value>,
) -> Vec<String> {
    let empty = serde_json::Map::new();
    let old = old.and_then(serde_json::Value::as_object).unwrap_or(&empty);
    let new = new.and_then(serde_json::Value::as_object).unwrap_or(&empty);

    let names: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    names
        .into_iter()
        .filter(|name| {
            let before = old.get(name.as_str()).map(hasher::hash_value);
            let after = new.get(name.as_str()).map(hasher::hash_value);
            before != after
        })
        .cloned()
        .collect()
}

/// Generate a human-readable description of a planned action.
fn describe_action(
    logical_id: &str,
    entry: &ResourceEntry,
    action: PlanAction,
    changed: &[String],
) -> String {
    match action {
        PlanAction::Create => format!("{}: create {}", logical_id, entry.resource_type),
        PlanAction::Update if changed.is_empty() => {
            format!("{}: update (resource attributes changed)", logical_id)
        }
        PlanAction::Update => format!("{}: update {}", logical_id, changed.join(", ")),
        PlanAction::Replace => format!("{}: replace ({} changed)", logical_id, changed.join(", ")),
        PlanAction::Delete => format!("{}: delete {}", logical_id, entry.resource_type),
        PlanAction::NoOp => format!("{}: no changes", logical_id),
    }
}
