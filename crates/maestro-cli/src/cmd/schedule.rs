use super::{ensure_actor, load_procedure, wants_json};
use crate::output::{print_json, print_table};
use anyhow::Context;
use maestro_core::io::atomic_write;
use maestro_core::report::TimelineReport;
use std::path::Path;

pub fn run(
    root: &Path,
    procedure: &str,
    actor: Option<&str>,
    output: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let (config, procedure) = load_procedure(root, procedure)?;
    if let Some(actor) = actor {
        ensure_actor(&procedure, actor)?;
    }

    let report = TimelineReport::new(&procedure, actor);

    if let Some(path) = output {
        let data = serde_json::to_string_pretty(&report)?;
        atomic_write(path, data.as_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote timeline");
    }

    if wants_json(&config, json) {
        return print_json(&report);
    }

    println!("{}", report.procedure);
    println!();

    let rows = report
        .entries
        .iter()
        .map(|e| {
            vec![
                e.task.to_string(),
                e.title.clone(),
                e.actor.clone(),
                e.role.clone(),
                e.start.clone(),
                e.end.clone(),
                e.duration.clone(),
            ]
        })
        .collect();
    print_table(
        &["#", "TASK", "ACTOR", "ROLE", "START", "END", "DURATION"],
        rows,
    );

    println!();
    match &report.actual_duration {
        Some(d) => println!("Actual duration: {d}"),
        None => println!("Nothing scheduled."),
    }
    Ok(())
}
