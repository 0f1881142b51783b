use std::io;

use thiserror::Error;

/// Fatal pipeline failures. Row-level validation problems and routing-service
/// failures are handled in place (dropped rows, straight-line fallback) and
/// never reach this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to fetch sheet data: {0}")]
    Fetch(String),
    #[error("required column '{0}' is missing from the sheet header")]
    MissingColumn(&'static str),
    #[error("no rows with valid coordinates in the walk log")]
    EmptyDataset,
    #[error("failed to encode map data: {0}")]
    Render(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}
