//! Preset command
//!
//! Prints a built-in program so it can be edited or piped into `run -p`.
//! Only program text goes to stdout; the header goes to stderr.

use crate::PresetArgs;
use anyhow::{Result, bail};
use pbx_engine::presets::{self, Preset};

pub fn run(args: PresetArgs) -> Result<()> {
    let preset = lookup(&args)?;

    eprintln!("{} (format: {})", preset.name, preset.format);
    print!("{}", preset.program);
    Ok(())
}

/// Resolves the preset named in `args`, with filmic-chroma parameters.
pub fn lookup(args: &PresetArgs) -> Result<Preset> {
    let preset = match args.name.to_lowercase().as_str() {
        "filmic-chroma" => presets::filmic_chroma(args.scale, args.offset, args.invert),
        other => match presets::by_name(other) {
            Some(p) => p,
            None => bail!(
                "Unknown preset: {} (available: {})",
                args.name,
                presets::NAMES.join(", ")
            ),
        },
    };
    Ok(preset)
}
