use crate::config::Config;
use crate::error::{MaestroError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "maestro.yaml";
pub const DEFAULT_PROCEDURES_DIR: &str = "procedures";
pub const DEFAULT_TASKS_DIR: &str = "tasks";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn procedures_dir(root: &Path, config: &Config) -> PathBuf {
    root.join(&config.procedures_dir)
}

pub fn tasks_dir(root: &Path, config: &Config) -> PathBuf {
    root.join(&config.tasks_dir)
}

/// Task files live in a directory that is a sister of the one holding the
/// procedure: `<procedure dir>/../<tasks_dir>/<task_file>`.
pub fn task_file_path(procedure_file: &Path, tasks_dir: &str, task_file: &str) -> PathBuf {
    let procedure_dir = procedure_file.parent().unwrap_or(Path::new("."));
    procedure_dir
        .parent()
        .unwrap_or(Path::new(".."))
        .join(tasks_dir)
        .join(task_file)
}

/// Like [`task_file_path`], but fails if the file does not exist.
pub fn translate_path(procedure_file: &Path, tasks_dir: &str, task_file: &str) -> Result<PathBuf> {
    let path = task_file_path(procedure_file, tasks_dir, task_file);
    if !path.is_file() {
        return Err(MaestroError::TaskFileNotFound(path.display().to_string()));
    }
    Ok(path)
}

/// Resolve a procedure named on the command line: an existing path as given,
/// then `<root>/<procedures_dir>/<name>`, then the same with `.yml` appended.
pub fn resolve_procedure(root: &Path, config: &Config, name: &str) -> Result<PathBuf> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Ok(direct.to_path_buf());
    }

    let dir = procedures_dir(root, config);
    for candidate in [dir.join(name), dir.join(format!("{name}.yml"))] {
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(MaestroError::ProcedureNotFound(name.to_string()))
}

// ---------------------------------------------------------------------------
// Filename sanitization
// ---------------------------------------------------------------------------

static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();
static RESERVED_RE: OnceLock<Regex> = OnceLock::new();

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn reserved_re() -> &'static Regex {
    RESERVED_RE.get_or_init(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).unwrap())
}

/// Turn a procedure name into something safe to use as a file name stem.
pub fn filename_for(name: &str) -> String {
    let joined = whitespace_re().replace_all(name.trim(), "_");
    reserved_re().replace_all(&joined, "!").into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
