use super::wants_json;
use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use maestro_core::config::{Config, WarnLevel};
use maestro_core::paths;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration (defaults filled in)
    Show,

    /// Validate the config for common mistakes
    Validate,

    /// Write a default maestro.yaml if none exists
    Init,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
        ConfigSubcommand::Init => init(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    if wants_json(&config, json) {
        return print_json(&config);
    }

    println!("procedures_dir: {}", config.procedures_dir);
    println!("tasks_dir:      {}", config.tasks_dir);
    println!("output.format:  {}", config.output.format);
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate(root);

    if wants_json(&config, json) {
        print_json(&serde_json::json!({ "warnings": warnings }))?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}

fn init(root: &Path, json: bool) -> anyhow::Result<()> {
    let written = Config::init(root).context("failed to write config")?;
    let path = paths::config_path(root);
    let config = Config::load(root).context("failed to load config")?;

    if wants_json(&config, json) {
        print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "created": written,
        }))?;
    } else if written {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists, left unchanged", path.display());
    }
    Ok(())
}
