use nova_core::{TextRange, TextSize};
use thiserror::Error;

/// Faults that abort highlighting of a single file.
///
/// Problems in the analysed code are never errors here: they are reported as
/// [`crate::Diagnostic`] records. These variants describe engine or host failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HighlightError {
    #[error("the diagnostic holder is not writable")]
    SinkNotWritable,

    #[error("diagnostic range {range:?} lies outside of the file (length {file_len:?})")]
    RangeOutOfBounds { range: TextRange, file_len: TextSize },

    #[error("unexpected annotation member value at {range:?}")]
    UnexpectedAnnotationValue { range: TextRange },

    #[error("missing declaration for {what}")]
    MissingDeclaration { what: String },

    #[error("highlighting was cancelled")]
    Cancelled,
}

pub type Result<T, E = HighlightError> = std::result::Result<T, E>;
