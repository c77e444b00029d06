//! Error types for format negotiation.
//!
//! # Usage
//!
//! ```rust
//! use pbx_core::{Error, PixelFormat};
//!
//! let err = "cmyk".parse::<PixelFormat>().unwrap_err();
//! assert!(matches!(err, Error::UnsupportedFormat { .. }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while selecting or validating a pixel format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No channel layout is known under this name.
    #[error("unsupported pixel format: {format}")]
    UnsupportedFormat {
        /// Format name as given by the caller
        format: String,
    },

    /// Channel count of a format does not match the buffer stride.
    #[error("channel mismatch: format has {expected} channels, buffer stride is {got}")]
    ChannelMismatch {
        /// Channel count of the format
        expected: usize,
        /// Declared stride of the buffer
        got: usize,
    },
}

impl Error {
    /// Creates an [`Error::UnsupportedFormat`] error.
    #[inline]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates an [`Error::ChannelMismatch`] error.
    #[inline]
    pub fn channel_mismatch(expected: usize, got: usize) -> Self {
        Self::ChannelMismatch { expected, got }
    }
}
