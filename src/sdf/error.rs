use std::io;

use thiserror::Error;

use crate::sanitize::SanitizeError;

/// Errors raised while reading an SDF file.
///
/// Record numbers are 0-based positions in the file; line numbers are
/// 1-based and count from the start of the file.
#[derive(Debug, Error)]
pub enum SdfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("record {record}: missing counts line")]
    MissingCountsLine { record: usize },

    #[error("record {record}: unsupported molfile version '{version}'")]
    UnsupportedVersion { record: usize, version: String },

    #[error("record {record}, line {line}: invalid counts line '{content}'")]
    InvalidCount {
        record: usize,
        line: usize,
        content: String,
    },

    #[error("record {record}: {block} block ends after {found} of {expected} lines")]
    TruncatedBlock {
        record: usize,
        block: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("record {record}, line {line}: invalid atom line: {reason}")]
    InvalidAtomLine {
        record: usize,
        line: usize,
        reason: String,
    },

    #[error("record {record}, line {line}: invalid bond line: {reason}")]
    InvalidBondLine {
        record: usize,
        line: usize,
        reason: String,
    },

    #[error("record {record}, line {line}: unknown element symbol '{symbol}'")]
    UnknownElement {
        record: usize,
        line: usize,
        symbol: String,
    },

    #[error("record {record}, line {line}: invalid property line: {reason}")]
    InvalidProperty {
        record: usize,
        line: usize,
        reason: String,
    },

    #[error("record {record}: sanitization failed: {source}")]
    Sanitize {
        record: usize,
        #[source]
        source: SanitizeError,
    },
}

impl SdfError {
    /// Record the error belongs to; `None` for I/O failures.
    pub fn record(&self) -> Option<usize> {
        match self {
            SdfError::Io(_) => None,
            SdfError::MissingCountsLine { record }
            | SdfError::UnsupportedVersion { record, .. }
            | SdfError::InvalidCount { record, .. }
            | SdfError::TruncatedBlock { record, .. }
            | SdfError::InvalidAtomLine { record, .. }
            | SdfError::InvalidBondLine { record, .. }
            | SdfError::UnknownElement { record, .. }
            | SdfError::InvalidProperty { record, .. }
            | SdfError::Sanitize { record, .. } => Some(*record),
        }
    }
}

impl From<SdfError> for io::Error {
    fn from(err: SdfError) -> Self {
        match err {
            SdfError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
