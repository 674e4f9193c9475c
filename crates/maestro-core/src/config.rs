use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const CONFIG_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

/// Project settings from `maestro.yaml`. Every field has a default, so a
/// project without the file behaves as if it held `{}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_procedures_dir")]
    pub procedures_dir: String,
    #[serde(default = "default_tasks_dir")]
    pub tasks_dir: String,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_procedures_dir() -> String {
    paths::DEFAULT_PROCEDURES_DIR.to_string()
}

fn default_tasks_dir() -> String {
    paths::DEFAULT_TASKS_DIR.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            procedures_dir: default_procedures_dir(),
            tasks_dir: default_tasks_dir(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config unless one already exists. Returns true if
    /// a file was written.
    pub fn init(root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Self::default())?;
        crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self, root: &Path) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version != CONFIG_VERSION {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "unsupported config version {} (expected {CONFIG_VERSION})",
                    self.version
                ),
            });
        }

        for (key, value, dir) in [
            (
                "procedures_dir",
                &self.procedures_dir,
                paths::procedures_dir(root, self),
            ),
            ("tasks_dir", &self.tasks_dir, paths::tasks_dir(root, self)),
        ] {
            if value.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("{key} must not be empty"),
                });
            } else if !dir.is_dir() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("{key} '{value}' does not exist under {}", root.display()),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
