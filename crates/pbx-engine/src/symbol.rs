//! Name resolution against a pixel format.
//!
//! The namespace is fixed: the format's letter aliases, positional channels
//! `c1`..`c4`, scratch variables `v1`..`v9` (`v` is `v1`) and the constants
//! `pi`, `e` and `rand`. Letter aliases are tried first, so a format letter
//! always shadows the other names.

use std::fmt;

use pbx_core::PixelFormat;

use crate::error::{CompileError, CompileResult};
use crate::lexer::Token;

/// Number of scratch variable slots per pixel.
pub const VARIABLES: usize = 9;

/// Named constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
    /// π
    Pi,
    /// Euler's number.
    E,
    /// Fresh uniform sample from [0, 1) on every evaluation.
    Rand,
}

impl Constant {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Self::Pi),
            "e" => Some(Self::E),
            "rand" => Some(Self::Rand),
            _ => None,
        }
    }
}

/// Resolved identity of an identifier.
///
/// Channel and variable indices are zero-based slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Channel slot of the current pixel.
    Channel(usize),
    /// Scratch variable slot (`v1` is slot 0).
    Variable(usize),
    /// Named constant.
    Constant(Constant),
}

impl Symbol {
    /// Whether an instruction may write to this symbol.
    #[inline]
    pub fn is_assignable(&self) -> bool {
        matches!(self, Self::Channel(_) | Self::Variable(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(i) => write!(f, "c{}", i + 1),
            Self::Variable(i) => write!(f, "v{}", i + 1),
            Self::Constant(Constant::Pi) => f.write_str("pi"),
            Self::Constant(Constant::E) => f.write_str("e"),
            Self::Constant(Constant::Rand) => f.write_str("rand"),
        }
    }
}

/// Read-only view of the names available for one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolTable {
    format: PixelFormat,
}

impl SymbolTable {
    /// Table for `format`.
    pub fn new(format: PixelFormat) -> Self {
        Self { format }
    }

    /// Table for `format`, checked against the buffer stride.
    pub fn with_stride(format: PixelFormat, stride: usize) -> CompileResult<Self> {
        if format.check_stride(stride).is_err() {
            return Err(CompileError::StrideMismatch {
                format: format.to_string(),
                channels: format.channels(),
                stride,
            });
        }
        Ok(Self::new(format))
    }

    /// Active format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Channel count of the active format.
    #[inline]
    pub fn channels(&self) -> usize {
        self.format.channels()
    }

    /// Resolves a token to a symbol.
    ///
    /// Returns `Ok(None)` when the name is not a symbol at all (it may
    /// still be a numeric literal) and an error when it names a positional
    /// channel the format does not have.
    pub fn resolve(&self, token: &Token) -> CompileResult<Option<Symbol>> {
        let name = token.text.as_str();

        if let Some(idx) = self.format.channel_index(name) {
            return Ok(Some(Symbol::Channel(idx)));
        }

        if let Some(idx) = PixelFormat::positional_index(name) {
            if idx >= self.channels() {
                return Err(CompileError::ChannelOutOfRange {
                    token: token.text.clone(),
                    index: token.index,
                    line: token.line,
                    channels: self.channels(),
                });
            }
            return Ok(Some(Symbol::Channel(idx)));
        }

        if let Some(slot) = variable_slot(name) {
            return Ok(Some(Symbol::Variable(slot)));
        }

        Ok(Constant::lookup(name).map(Symbol::Constant))
    }
}

fn variable_slot(name: &str) -> Option<usize> {
    let digits = name.strip_prefix('v')?;
    if digits.is_empty() {
        return Some(0);
    }
    match digits.as_bytes() {
        [d @ b'1'..=b'9'] => Some(usize::from(d - b'1')),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str) -> Token {
        Token {
            text: text.to_string(),
            index: 0,
            line: 1,
            offset: 0,
        }
    }

    fn resolve(format: PixelFormat, name: &str) -> Option<Symbol> {
        SymbolTable::new(format).resolve(&tok(name)).unwrap()
    }

    #[test]
    fn test_letters_and_positions_agree() {
        let table = SymbolTable::new(PixelFormat::Rgba);
        for (letter, pos) in [("r", "c1"), ("g", "c2"), ("b", "c3"), ("a", "c4")] {
            assert_eq!(
                table.resolve(&tok(letter)).unwrap(),
                table.resolve(&tok(pos)).unwrap()
            );
        }
    }

    #[test]
    fn test_variables() {
        assert_eq!(resolve(PixelFormat::Rgba, "v"), Some(Symbol::Variable(0)));
        assert_eq!(resolve(PixelFormat::Rgba, "v1"), Some(Symbol::Variable(0)));
        assert_eq!(resolve(PixelFormat::Rgba, "v9"), Some(Symbol::Variable(8)));
        assert_eq!(resolve(PixelFormat::Rgba, "v0"), None);
        assert_eq!(resolve(PixelFormat::Rgba, "v10"), None);
    }

    #[test]
    fn test_constants() {
        assert_eq!(
            resolve(PixelFormat::Lcha, "pi"),
            Some(Symbol::Constant(Constant::Pi))
        );
        assert_eq!(
            resolve(PixelFormat::Lcha, "e"),
            Some(Symbol::Constant(Constant::E))
        );
        assert_eq!(
            resolve(PixelFormat::Lcha, "rand"),
            Some(Symbol::Constant(Constant::Rand))
        );
        assert!(!Symbol::Constant(Constant::Pi).is_assignable());
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(resolve(PixelFormat::Lcha, "r"), None);
        assert_eq!(resolve(PixelFormat::Raw4, "a"), None);
    }

    #[test]
    fn test_positional_out_of_range() {
        let err = SymbolTable::new(PixelFormat::Rgb)
            .resolve(&tok("c4"))
            .unwrap_err();
        assert!(matches!(err, CompileError::ChannelOutOfRange { channels: 3, .. }));
    }

    #[test]
    fn test_stride_check() {
        assert!(SymbolTable::with_stride(PixelFormat::Hsla, 4).is_ok());
        let err = SymbolTable::with_stride(PixelFormat::Hsla, 3).unwrap_err();
        assert!(matches!(
            err,
            CompileError::StrideMismatch {
                channels: 4,
                stride: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Symbol::Channel(0).to_string(), "c1");
        assert_eq!(Symbol::Variable(8).to_string(), "v9");
        assert_eq!(Symbol::Constant(Constant::Rand).to_string(), "rand");
    }
}
