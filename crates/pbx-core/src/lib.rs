//! # pbx-core
//!
//! Core types for the pixelbuster pixel-math engine.
//!
//! This crate provides the foundational types shared by the engine and its
//! hosts:
//!
//! - [`PixelFormat`] - The closed set of channel layouts a buffer can use
//! - [`Error`], [`Result`] - Errors raised while negotiating a format
//!
//! ## Crate Structure
//!
//! ```text
//! pbx-core (this crate)
//!    ^
//!    |
//!    +-- pbx-engine (lexer, compiler, interpreter, buffer driver)
//!    +-- pbx-cli (raw buffer host)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod format;

pub use error::*;
pub use format::*;
