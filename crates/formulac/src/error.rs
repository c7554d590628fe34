//! Error handling for the formulac CLI.

use thiserror::Error;

/// Top-level error type for the formulac CLI.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Engine(#[from] formula_engine::EngineError),

    #[error(transparent)]
    Step(#[from] formula_engine::StepError),

    #[error("invalid --var binding '{0}': expected NAME=VALUE")]
    BadBinding(String),

    #[error("failed to read '{path}': {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("invalid steps file: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// The process exit code convention used by `main`: engine errors keep
    /// their own phase-specific code, CLI-local errors use 64 (EX_USAGE)
    /// or 66 (EX_NOINPUT).
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(err) => err.exit_code(),
            CliError::Step(err) => err.cause.exit_code(),
            CliError::BadBinding(_) | CliError::Json(_) => 64,
            CliError::Io { .. } => 66,
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
