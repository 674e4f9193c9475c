use super::{load_procedure, wants_json};
use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;

pub fn run(root: &Path, procedure: &str, json: bool) -> anyhow::Result<()> {
    let (config, procedure) = load_procedure(root, procedure)?;
    let total = procedure
        .actual_duration()
        .with_context(|| format!("cannot compute duration of '{}'", procedure.name))?;

    let per_actor: Vec<(&str, String)> = procedure
        .actors_in_lead_roles()
        .into_iter()
        .filter_map(|a| procedure.actor_duration(a).map(|d| (a, d.to_string())))
        .collect();

    if wants_json(&config, json) {
        let actors: serde_json::Map<String, serde_json::Value> = per_actor
            .iter()
            .map(|(a, d)| (a.to_string(), serde_json::Value::from(d.as_str())))
            .collect();
        return print_json(&serde_json::json!({
            "procedure": procedure.name,
            "actual_duration": total.to_string(),
            "actual_duration_seconds": total.total_seconds(),
            "actors": actors,
        }));
    }

    println!("Actual duration: {total}");
    println!();
    let rows = per_actor
        .into_iter()
        .map(|(a, d)| vec![a.to_string(), d])
        .collect();
    print_table(&["ACTOR", "FINISHES"], rows);
    Ok(())
}
