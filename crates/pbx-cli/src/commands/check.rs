//! Check command
//!
//! Compiles a program and prints the canonical instruction listing.

use crate::CheckArgs;
use tracing::trace;
use anyhow::{Context, Result};
use pbx_engine::Program;

pub fn run(args: CheckArgs) -> Result<()> {
    trace!(format = %args.format, "check::run");

    let format = super::parse_format(&args.format)?;
    let source = super::read_program(&args.source)?;
    let program = Program::compile(&source, format).context("Program failed to compile")?;

    print!("{}", program.listing());
    println!(
        "# {} instruction(s), format {} ({} channels){}",
        program.len(),
        format,
        format.channels(),
        if program.uses_rand() { ", uses rand" } else { "" }
    );

    Ok(())
}
