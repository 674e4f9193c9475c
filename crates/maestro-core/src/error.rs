use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaestroError {
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    #[error("actor '{actor}' is bound to more than one role in task '{task}'")]
    DuplicateRole { task: String, actor: String },

    #[error("procedure has no scheduled tasks")]
    EmptyProcedure,

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("could not find procedure file {0}")]
    ProcedureNotFound(String),

    #[error("could not find task file {0}")]
    TaskFileNotFound(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MaestroError>;
