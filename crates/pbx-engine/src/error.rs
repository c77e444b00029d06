//! Error types for compiling and applying programs.
//!
//! Two classes exist. [`CompileError`] covers everything wrong with the
//! program text or its relation to the pixel format. [`EngineError`] adds
//! buffer preconditions. Both are raised before any pixel is touched;
//! numeric results (NaN, infinity) are never errors.

use thiserror::Error;

/// Failure while turning program text into instructions.
///
/// Token-level variants carry the case-folded token text, its index in the
/// token stream and its 1-based line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Token count is not a multiple of three.
    #[error("line {line}: incomplete statement, dangling tokens {tokens:?}")]
    DanglingTokens {
        /// Tokens that do not form a full statement
        tokens: Vec<String>,
        /// Index of the first dangling token
        index: usize,
        /// Line of the first dangling token
        line: usize,
    },

    /// Identifier names no channel, variable or constant.
    #[error("line {line}: unknown identifier '{token}' (token {index})")]
    UnknownIdentifier {
        /// Offending token
        token: String,
        /// Token index
        index: usize,
        /// Line number
        line: usize,
    },

    /// Token looks numeric but is not a valid decimal number.
    #[error("line {line}: malformed number '{token}' (token {index})")]
    MalformedNumber {
        /// Offending token
        token: String,
        /// Token index
        index: usize,
        /// Line number
        line: usize,
    },

    /// Operator token is not in the alias table.
    #[error("line {line}: unknown operator '{token}' (token {index})")]
    UnknownOperator {
        /// Offending token
        token: String,
        /// Token index
        index: usize,
        /// Line number
        line: usize,
    },

    /// Target is a constant or a literal.
    #[error("line {line}: cannot assign to '{token}' (token {index})")]
    NotAssignable {
        /// Offending token
        token: String,
        /// Token index
        index: usize,
        /// Line number
        line: usize,
    },

    /// Positional channel beyond the format's channel count.
    #[error("line {line}: channel '{token}' does not exist in a {channels}-channel format")]
    ChannelOutOfRange {
        /// Offending token
        token: String,
        /// Token index
        index: usize,
        /// Line number
        line: usize,
        /// Channel count of the active format
        channels: usize,
    },

    /// Active format does not match the buffer stride.
    #[error("format '{format}' has {channels} channels but buffer stride is {stride}")]
    StrideMismatch {
        /// Active format name
        format: String,
        /// Channel count of the format
        channels: usize,
        /// Declared stride
        stride: usize,
    },

    /// No alias table exists for the requested format.
    #[error("unknown pixel format '{0}'")]
    UnknownFormat(String),
}

impl CompileError {
    /// Line the error points at, when it refers to a token.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::DanglingTokens { line, .. }
            | Self::UnknownIdentifier { line, .. }
            | Self::MalformedNumber { line, .. }
            | Self::UnknownOperator { line, .. }
            | Self::NotAssignable { line, .. }
            | Self::ChannelOutOfRange { line, .. } => Some(*line),
            Self::StrideMismatch { .. } | Self::UnknownFormat(_) => None,
        }
    }
}

impl From<pbx_core::Error> for CompileError {
    fn from(err: pbx_core::Error) -> Self {
        match err {
            pbx_core::Error::UnsupportedFormat { format } => Self::UnknownFormat(format),
            pbx_core::Error::ChannelMismatch { expected, got } => Self::StrideMismatch {
                format: String::new(),
                channels: expected,
                stride: got,
            },
        }
    }
}

/// Error returned by [`crate::apply`] and [`crate::Engine`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Program failed to compile.
    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    /// Buffer length does not match pixel count times channel count.
    #[error("buffer length mismatch: expected {expected} values, got {actual}")]
    Precondition {
        /// pixel_count * channels
        expected: usize,
        /// Actual buffer length
        actual: usize,
    },

    /// pixel_count * channels overflows usize.
    #[error("buffer size overflow: {pixels} pixels x {channels} channels")]
    SizeOverflow {
        /// Requested pixel count
        pixels: usize,
        /// Channel count
        channels: usize,
    },
}

impl EngineError {
    /// Returns `true` for compile-time failures.
    #[inline]
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Self::Compile(_))
    }

    /// Returns `true` for buffer precondition failures.
    #[inline]
    pub fn is_precondition_error(&self) -> bool {
        matches!(self, Self::Precondition { .. } | Self::SizeOverflow { .. })
    }
}

/// Result type for compile-only operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_line() {
        let err = CompileError::UnknownOperator {
            token: "xor".into(),
            index: 4,
            line: 2,
        };
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("xor"));
        assert_eq!(CompileError::UnknownFormat("cmyk".into()).line(), None);
    }

    #[test]
    fn test_core_error_conversion() {
        let err: CompileError = pbx_core::Error::unsupported_format("cmyk").into();
        assert_eq!(err, CompileError::UnknownFormat("cmyk".into()));
    }

    #[test]
    fn test_engine_error_classes() {
        let err: EngineError = CompileError::UnknownFormat("x".into()).into();
        assert!(err.is_compile_error());
        let err = EngineError::Precondition {
            expected: 8,
            actual: 7,
        };
        assert!(err.is_precondition_error());
        assert!(err.to_string().contains('8'));
    }
}
