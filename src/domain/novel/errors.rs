//! Novel Context - Errors

use thiserror::Error;

use super::HeadingPattern;

#[derive(Debug, Error)]
pub enum NovelError {
    #[error("could not reliably detect chapter format: few or no chapter titles found in sample")]
    FormatNotDetected,

    #[error("no chapters found using the {0} format")]
    NoChapters(HeadingPattern),

    #[error("failed to read {path}: {reason}")]
    FileRead { path: String, reason: String },
}
