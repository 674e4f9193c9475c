use super::{load_procedure, wants_json};
use crate::output::print_json;
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, procedure: &str, task: Option<&str>, json: bool) -> anyhow::Result<()> {
    let (config, procedure) = load_procedure(root, procedure)?;
    let not_used = |file: &str| format!("task file '{file}' is not used by '{}'", procedure.name);

    if wants_json(&config, json) {
        return match task {
            Some(file) => {
                let def = procedure
                    .task_definitions()
                    .get(file)
                    .with_context(|| not_used(file))?;
                print_json(def)
            }
            None => print_json(&serde_json::json!({
                "procedure": procedure.definition(),
                "tasks": procedure.task_definitions(),
            })),
        };
    }

    let yaml = match task {
        Some(file) => procedure
            .task_definition_yaml(file)
            .with_context(|| not_used(file))?,
        None => procedure.definition_yaml()?,
    };
    print!("{yaml}");
    Ok(())
}
