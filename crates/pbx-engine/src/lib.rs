//! # pbx-engine
//!
//! Per-pixel arithmetic on flat `f64` image buffers, driven by a tiny
//! statement language.
//!
//! A program is a sequence of `target operator operand` statements:
//!
//! ```text
//! v = l        # copy lightness into a scratch variable
//! v / 100
//! c * v        # scale chroma by lightness
//! ```
//!
//! Targets are channels (`r`, `c2`, ...) or variables (`v1`..`v9`);
//! operands may also be numbers or the constants `pi`, `e` and `rand`.
//! (The language itself has no comments; the `#` notes above are only for
//! the reader.)
//!
//! # Pipeline
//!
//! ```text
//! text --lexer--> tokens --compiler(+symbol table)--> Program
//!                                                       |
//!                      buffer --driver--> partitions --interp--> buffer
//! ```
//!
//! # Example
//!
//! ```rust
//! use pbx_core::PixelFormat;
//! use pbx_engine::apply;
//!
//! let mut pixels = [0.2, 0.4, 0.6, 1.0];
//! apply("r + 0.1", PixelFormat::Rgba, &mut pixels, 1).unwrap();
//! assert!((pixels[0] - 0.3).abs() < 1e-12);
//! ```
//!
//! # Modules
//!
//! - [`lexer`] - Whitespace tokenizer
//! - [`symbol`] - Channel, variable and constant names
//! - [`op`] - Operator spellings and semantics
//! - [`compiler`] - Statements to [`Program`]
//! - [`interp`] - Per-pixel execution
//! - [`driver`] - Partitioned execution over a buffer
//! - [`presets`] - Ready-made programs

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod engine;
mod error;
pub mod compiler;
pub mod driver;
pub mod interp;
pub mod lexer;
pub mod op;
pub mod presets;
pub mod symbol;

pub use compiler::{Instruction, Operand, Program, Target};
pub use driver::{RunStats, WorkerPool};
pub use engine::{check_buffer, Engine, EngineBuilder, EngineConfig, DEFAULT_MIN_PARTITION_PIXELS};
pub use error::{CompileError, CompileResult, EngineError, EngineResult};
pub use op::{Operator, Shape};
pub use pbx_core::PixelFormat;
pub use symbol::{Constant, Symbol, SymbolTable};

/// Applies `program` to every pixel of `buffer` with default settings.
///
/// `buffer` must hold exactly `pixel_count * format.channels()` values.
/// On error the buffer is left unchanged.
pub fn apply(
    program: &str,
    format: PixelFormat,
    buffer: &mut [f64],
    pixel_count: usize,
) -> EngineResult<()> {
    Engine::new()
        .apply(program, format, buffer, pixel_count)
        .map(|_| ())
}
