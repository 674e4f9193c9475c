use super::{load_procedure, wants_json};
use crate::output::{print_json, print_table};
use std::path::Path;

pub fn run(root: &Path, procedure: &str, include_empty: bool, json: bool) -> anyhow::Result<()> {
    let (config, procedure) = load_procedure(root, procedure)?;

    // Pair every column with the actors landing in it; indices line up when
    // empty groups are kept.
    let grouped = procedure.columns_of_actors_filling_roles(true);
    let columns: Vec<_> = procedure
        .columns()
        .iter()
        .zip(grouped)
        .filter(|(_, actors)| include_empty || !actors.is_empty())
        .collect();

    if wants_json(&config, json) {
        let items: Vec<_> = columns
            .iter()
            .map(|(col, actors)| {
                serde_json::json!({
                    "key": col.key,
                    "display": col.display_name(),
                    "actors": actors,
                })
            })
            .collect();
        return print_json(&items);
    }

    let rows = columns
        .iter()
        .map(|(col, actors)| {
            vec![
                col.key.clone(),
                col.display_name().to_string(),
                actors.join(", "),
            ]
        })
        .collect();
    print_table(&["KEY", "DISPLAY", "ACTORS"], rows);
    Ok(())
}
