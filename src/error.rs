//! Error taxonomy: load-time failures are fatal and operator-facing,
//! per-request failures map to client-facing HTTP responses.

use std::path::PathBuf;
use thiserror::Error;

/// Startup/artifact errors. `main` treats any of these as fatal; the process
/// must not start serving with a partially loaded pipeline.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fusion model not found: {path}")]
    MissingFusionModel { path: PathBuf },

    #[error("source veracity table missing required column '{column}'")]
    MissingTableColumn { column: &'static str },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Per-request failures surfaced by the decision engine.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Prediction requested before `load()` completed.
    #[error("pipeline artifacts are not loaded")]
    NotLoaded,

    /// Nothing to score: no title, claim, body, or source_url.
    #[error("empty input: provide at least one of title, claim, body, source_url")]
    EmptyInput,

    /// A scorer failed at inference time. The engine never substitutes a
    /// guessed probability for a failed scorer.
    #[error("scorer '{scorer}' unavailable: {message}")]
    ScorerUnavailable { scorer: &'static str, message: String },
}

impl PipelineError {
    /// Stable machine-readable kind for the error payload.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::NotLoaded => "not-loaded",
            PipelineError::EmptyInput => "empty-input",
            PipelineError::ScorerUnavailable { .. } => "scorer-unavailable",
        }
    }
}
