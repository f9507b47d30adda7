// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pixwand.

use thiserror::Error;

/// Top-level error type for all pixwand operations.
#[derive(Debug, Error)]
pub enum PixwandError {
    // -- Argument validation --
    /// Wrong arity, malformed geometry, bad channel map, out-of-range region.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A value of the wrong kind where an enumerated token was required.
    #[error("wrong argument type {found} (expected {expected})")]
    TypeMismatch { expected: String, found: String },

    /// An operation that needs a caller-supplied callback was called without one.
    #[error("no block given: {0}")]
    MissingCallback(String),

    // -- Codec errors --
    #[error("image decoding failed: {0}")]
    Decode(String),

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Pixel access on an image that only carries header data (see `ping`).
    #[error("image has no pixel data: {0}")]
    NoPixelData(String),

    // -- Engine --
    #[error("image engine failure: {0}")]
    Engine(String),

    // -- Storage / configuration --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl PixwandError {
    /// Shorthand for a [`PixwandError::TypeMismatch`].
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Shorthand for the arity violation raised at the argument boundary.
    pub fn arity(given: usize, expected: &str) -> Self {
        Self::InvalidArgument(format!(
            "wrong number of arguments ({given} for {expected})"
        ))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PixwandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_message_names_both_counts() {
        let err = PixwandError::arity(7, "5 or 6");
        assert_eq!(
            err.to_string(),
            "invalid argument: wrong number of arguments (7 for 5 or 6)"
        );
    }

    #[test]
    fn type_mismatch_message() {
        let err = PixwandError::type_mismatch("ChannelType", "Integer");
        assert_eq!(
            err.to_string(),
            "wrong argument type Integer (expected ChannelType)"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.gif");
        let err: PixwandError = io.into();
        assert!(matches!(err, PixwandError::Io(_)));
    }
}
