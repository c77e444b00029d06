//! Single-pass compiler from tokens to instructions.
//!
//! A program is a flat sequence of `target operator operand` triples.
//! Statements are grouped purely by count, so line breaks are cosmetic.
//! The output preserves program order exactly; there is no folding or
//! reordering because later statements read what earlier ones wrote.
//!
//! # Example
//!
//! ```rust
//! use pbx_core::PixelFormat;
//! use pbx_engine::compiler::Program;
//!
//! let program = Program::compile("v = l\nv / 100\nc * v", PixelFormat::Lcha).unwrap();
//! assert_eq!(program.len(), 3);
//! assert_eq!(program.listing(), "v1 = c1\nv1 / 100\nc2 * v1\n");
//! ```

use std::fmt;

use pbx_core::PixelFormat;
use tracing::{debug, trace};

use crate::error::{CompileError, CompileResult};
use crate::lexer::{tokenize, Token};
use crate::op::Operator;
use crate::symbol::{Constant, Symbol, SymbolTable};

/// Writable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Channel slot of the current pixel.
    Channel(usize),
    /// Scratch variable slot.
    Variable(usize),
}

/// Readable value source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    /// Channel slot of the current pixel.
    Channel(usize),
    /// Scratch variable slot.
    Variable(usize),
    /// Numeric literal.
    Literal(f64),
    /// Named constant.
    Constant(Constant),
}

/// One compiled statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    /// Slot receiving the result.
    pub target: Target,
    /// Canonical operator.
    pub op: Operator,
    /// Right-hand value.
    pub operand: Operand,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Target::Channel(i) => write!(f, "{} ", Symbol::Channel(i))?,
            Target::Variable(i) => write!(f, "{} ", Symbol::Variable(i))?,
        }
        write!(f, "{} ", self.op)?;
        match self.operand {
            Operand::Channel(i) => write!(f, "{}", Symbol::Channel(i)),
            Operand::Variable(i) => write!(f, "{}", Symbol::Variable(i)),
            Operand::Constant(c) => write!(f, "{}", Symbol::Constant(c)),
            Operand::Literal(n) => write!(f, "{n}"),
        }
    }
}

/// Compiled, immutable instruction list bound to one pixel format.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    format: PixelFormat,
    instructions: Vec<Instruction>,
}

impl Program {
    /// Compiles program text for `format`.
    ///
    /// Fails on the first bad statement; no partial program is returned.
    pub fn compile(source: &str, format: PixelFormat) -> CompileResult<Self> {
        Self::compile_with(source, SymbolTable::new(format))
    }

    /// Compiles against a prepared symbol table.
    pub fn compile_with(source: &str, symbols: SymbolTable) -> CompileResult<Self> {
        let tokens = tokenize(source);
        trace!(tokens = tokens.len(), format = %symbols.format(), "compile");

        let statements = tokens.chunks_exact(3);
        let dangling = statements.remainder();
        if let Some(first) = dangling.first() {
            return Err(CompileError::DanglingTokens {
                tokens: dangling.iter().map(|t| t.text.clone()).collect(),
                index: first.index,
                line: first.line,
            });
        }

        let mut instructions = Vec::with_capacity(tokens.len() / 3);
        for stmt in statements {
            instructions.push(compile_statement(&symbols, &stmt[0], &stmt[1], &stmt[2])?);
        }

        debug!(
            instructions = instructions.len(),
            format = %symbols.format(),
            "Compiled program"
        );

        Ok(Self {
            format: symbols.format(),
            instructions,
        })
    }

    /// Format the program was compiled for.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Instructions in execution order.
    #[inline]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    #[inline]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the program does nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Whether any instruction reads `rand`.
    pub fn uses_rand(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| matches!(i.operand, Operand::Constant(Constant::Rand)))
    }

    /// Canonical text form, one instruction per line.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for inst in &self.instructions {
            out.push_str(&inst.to_string());
            out.push('\n');
        }
        out
    }
}

fn compile_statement(
    symbols: &SymbolTable,
    target: &Token,
    op: &Token,
    operand: &Token,
) -> CompileResult<Instruction> {
    let target = match symbols.resolve(target)? {
        Some(Symbol::Channel(i)) => Target::Channel(i),
        Some(Symbol::Variable(i)) => Target::Variable(i),
        Some(Symbol::Constant(_)) => return Err(not_assignable(target)),
        None if parse_number(&target.text).is_some() => return Err(not_assignable(target)),
        None => return Err(unresolved(target)),
    };

    let op = Operator::from_alias(&op.text).ok_or_else(|| CompileError::UnknownOperator {
        token: op.text.clone(),
        index: op.index,
        line: op.line,
    })?;

    let operand = match symbols.resolve(operand)? {
        Some(Symbol::Channel(i)) => Operand::Channel(i),
        Some(Symbol::Variable(i)) => Operand::Variable(i),
        Some(Symbol::Constant(c)) => Operand::Constant(c),
        None => match parse_number(&operand.text) {
            Some(n) => Operand::Literal(n),
            None => return Err(unresolved(operand)),
        },
    };

    Ok(Instruction {
        target,
        op,
        operand,
    })
}

fn not_assignable(token: &Token) -> CompileError {
    CompileError::NotAssignable {
        token: token.text.clone(),
        index: token.index,
        line: token.line,
    }
}

/// Picks between "bad number" and "bad name" by the first character.
fn unresolved(token: &Token) -> CompileError {
    let numeric_start = token
        .text
        .starts_with(|c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'));
    if numeric_start {
        CompileError::MalformedNumber {
            token: token.text.clone(),
            index: token.index,
            line: token.line,
        }
    } else {
        CompileError::UnknownIdentifier {
            token: token.text.clone(),
            index: token.index,
            line: token.line,
        }
    }
}

/// Parses a plain decimal literal.
///
/// Accepts `[+-]? (digits ('.' digits?)? | '.' digits) ([eE] [+-]? digits)?`
/// and nothing else; `inf`, `nan` and hex forms are rejected even though
/// `f64::from_str` would take some of them.
pub fn parse_number(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - frac_start;
    }

    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    if i != bytes.len() {
        return None;
    }
    text.parse().ok()
}
