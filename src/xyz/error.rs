use std::io;

use thiserror::Error;

/// Errors raised while reading an XYZ trajectory. Line numbers are 1-based;
/// frames are 0-based.
#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: invalid atom count '{content}'")]
    InvalidAtomCount { line: usize, content: String },

    #[error("frame {frame}: expected {expected} atom lines, found {found}")]
    Truncated {
        frame: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid coordinate line '{content}'")]
    InvalidCoordinate { line: usize, content: String },

    #[error("frame {frame} has {found} atoms, but the first frame has {expected}")]
    InconsistentAtomCount {
        frame: usize,
        expected: usize,
        found: usize,
    },
}
