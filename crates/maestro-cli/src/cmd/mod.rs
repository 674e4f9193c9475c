pub mod actors;
pub mod columns;
pub mod config;
pub mod definition;
pub mod duration;
pub mod schedule;
pub mod tasks;

use anyhow::Context;
use maestro_core::config::{Config, OutputFormat};
use maestro_core::{paths, Procedure};
use std::path::Path;

/// Resolve `name` against the project and load it, fully scheduled.
pub fn load_procedure(root: &Path, name: &str) -> anyhow::Result<(Config, Procedure)> {
    let config = Config::load(root).context("failed to load maestro.yaml")?;
    let path = paths::resolve_procedure(root, &config, name)
        .with_context(|| format!("procedure '{name}' not found"))?;
    let procedure = Procedure::load(&path, &config)
        .with_context(|| format!("failed to load procedure {}", path.display()))?;
    Ok((config, procedure))
}

/// `--json` wins; otherwise the project's configured output format.
pub fn wants_json(config: &Config, json_flag: bool) -> bool {
    json_flag || config.output.format == OutputFormat::Json
}

pub fn ensure_actor(procedure: &Procedure, actor: &str) -> anyhow::Result<()> {
    if procedure.endpoint(actor).is_none() {
        anyhow::bail!(
            "actor '{actor}' fills no role in '{}' (actors: {})",
            procedure.name,
            procedure.actors_in_lead_roles().join(", ")
        );
    }
    Ok(())
}
