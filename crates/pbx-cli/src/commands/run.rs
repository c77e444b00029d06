//! Run command
//!
//! Applies a program to a raw f64 buffer and writes the result.

use crate::RunArgs;
use tracing::{debug, info, trace};
use anyhow::{Context, Result, bail};
use pbx_engine::{Engine, Program, SymbolTable};

pub fn run(args: RunArgs, engine: &Engine, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), format = %args.format, "run::run");

    let format = super::parse_format(&args.format)?;
    let stride = args.channels.unwrap_or(format.channels());
    let source = super::read_program(&args.source)?;

    // Stride and program are checked before any pixel is read
    let program = SymbolTable::with_stride(format, stride)
        .and_then(|symbols| Program::compile_with(&source, symbols))
        .context("Program failed to compile")?;
    debug!(instructions = program.len(), rand = program.uses_rand(), "Compiled");

    let mut data = super::load_raw(&args.input)?;
    if data.len() % stride != 0 {
        bail!(
            "{} values in {} do not form whole {}-channel pixels",
            data.len(),
            args.input.display(),
            stride
        );
    }

    info!(
        format = %format,
        pixels = data.len() / stride,
        instructions = program.len(),
        "Applying program"
    );

    if verbose > 0 {
        println!(
            "Applying {} instruction(s) to {} ({}, {})",
            program.len(),
            args.input.display(),
            format,
            super::format_size((data.len() * 8) as u64)
        );
    }

    let stats = engine
        .run_strided(&program, &mut data, stride)
        .context("Failed to apply program")?;
    debug!(pixels = stats.pixels, partitions = stats.partitions, "Applied");

    super::save_raw(&args.output, &data)?;

    if verbose > 0 {
        println!("Done.");
    }

    Ok(())
}
