use super::{load_procedure, wants_json};
use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, procedure: &str, json: bool) -> anyhow::Result<()> {
    let (config, procedure) = load_procedure(root, procedure)?;
    let actors = procedure.actors_in_lead_roles();

    if wants_json(&config, json) {
        return print_json(&actors);
    }

    if actors.is_empty() {
        println!("No actors fill any role in '{}'.", procedure.name);
        return Ok(());
    }

    let rows = actors
        .iter()
        .map(|&a| {
            vec![
                a.to_string(),
                procedure.tasks_for_actor(a).count().to_string(),
                procedure
                    .actor_duration(a)
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    print_table(&["ACTOR", "TASKS", "FINISHES"], rows);
    Ok(())
}
