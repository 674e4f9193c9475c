use super::{ensure_actor, load_procedure, wants_json};
use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, procedure: &str, actor: &str, json: bool) -> anyhow::Result<()> {
    let (config, procedure) = load_procedure(root, procedure)?;
    ensure_actor(&procedure, actor)?;

    let chain: Vec<_> = procedure.chain(actor).collect();

    if wants_json(&config, json) {
        let items: Vec<_> = chain
            .iter()
            .map(|(task, binding)| {
                serde_json::json!({
                    "task": task.id.index() + 1,
                    "file": task.file,
                    "title": task.title,
                    "role": binding.role,
                    "start": binding.start.map(|d| d.to_string()),
                    "end": binding.end.map(|d| d.to_string()),
                    "joint": task.is_joint(),
                })
            })
            .collect();
        return print_json(&serde_json::json!({ "actor": actor, "tasks": items }));
    }

    let fmt = |d: Option<maestro_core::Duration>| d.map(|d| d.to_string()).unwrap_or_default();
    let rows = chain
        .iter()
        .map(|(task, binding)| {
            let others: Vec<&str> = task.actors().filter(|a| *a != actor).collect();
            vec![
                (task.id.index() + 1).to_string(),
                task.title.clone(),
                binding.role.clone(),
                fmt(binding.start),
                fmt(binding.end),
                others.join(", "),
            ]
        })
        .collect();
    print_table(&["#", "TASK", "ROLE", "START", "END", "WITH"], rows);
    Ok(())
}
