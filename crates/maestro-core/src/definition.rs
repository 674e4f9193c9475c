//! Procedure and task definitions as written in YAML.

use crate::columns::ColumnDefinition;
use crate::duration::Duration;
use crate::error::{MaestroError, Result};
use crate::ipv::IpvFields;
use crate::task::{RoleBinding, Task, TaskId};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};

// ---------------------------------------------------------------------------
// Procedure file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureDefinition {
    pub procedure_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_number: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<ColumnDefinition>,
    #[serde(default)]
    pub tasks: Vec<TaskReference>,
    #[serde(
        default,
        rename = "ipvFields",
        skip_serializing_if = "Option::is_none"
    )]
    pub ipv_fields: Option<IpvFields>,
}

impl ProcedureDefinition {
    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }
}

/// A task as placed in a procedure: which file defines it and which actor
/// fills each of its roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReference {
    pub file: String,
    /// Role name → actor.
    #[serde(default)]
    pub roles: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

// ---------------------------------------------------------------------------
// Task file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub title: String,
    #[serde(default)]
    pub roles: Vec<RoleDefinition>,
    /// Checklist content; carried through untouched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<serde_yaml::Value>,
}

impl TaskDefinition {
    pub fn from_yaml(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

/// Combine a procedure's reference to a task with the task's definition.
///
/// Every role the procedure fills must be declared by the task, and every
/// role the task declares must be filled. Bindings follow the order roles are
/// declared in the task file. An actor filling two roles is left for the
/// chain builder to reject.
pub fn bind_task(id: TaskId, reference: &TaskReference, def: &TaskDefinition) -> Result<Task> {
    let mut declared = HashSet::new();
    for role in &def.roles {
        if !declared.insert(role.name.as_str()) {
            return Err(MaestroError::Configuration(format!(
                "task '{}' declares role '{}' more than once",
                reference.file, role.name
            )));
        }
    }

    for (role, actor) in &reference.roles {
        if !declared.contains(role.as_str()) {
            return Err(MaestroError::Configuration(format!(
                "task '{}' has no role '{role}' (bound to actor '{actor}')",
                reference.file
            )));
        }
    }

    let mut task = Task::new(id, reference.file.clone(), def.title.clone());
    task.color = reference.color.clone();

    for role in &def.roles {
        let actor = reference.roles.get(&role.name).ok_or_else(|| {
            MaestroError::Configuration(format!(
                "role '{}' in task '{}' is not filled by any actor",
                role.name, reference.file
            ))
        })?;
        if actor.trim().is_empty() {
            return Err(MaestroError::Configuration(format!(
                "role '{}' in task '{}' is bound to an empty actor name",
                role.name, reference.file
            )));
        }
        task.bindings
            .push(RoleBinding::new(actor.clone(), role.name.clone(), role.duration));
    }

    Ok(task)
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accept either `key: value` or `key: [a, b]`.
pub(crate) fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
