use std::path::PathBuf;

use qprobe_core::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("unknown plan '{0}'")]
    Unknown(String),
    #[error("cannot read plan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed plan {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid plan '{plan}': {source}")]
    Invalid {
        plan: String,
        #[source]
        source: PipelineError,
    },
}
