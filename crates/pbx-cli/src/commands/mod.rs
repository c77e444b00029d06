//! CLI command implementations

pub mod check;
pub mod formats;
pub mod preset;
pub mod run;

use std::path::Path;

use anyhow::{Context, Result, bail};
use pbx_core::PixelFormat;
use pbx_engine::{Engine, EngineBuilder};

use crate::ProgramSource;

/// Engine using the global rayon pool.
pub fn engine(seed: Option<u64>) -> Engine {
    match seed {
        Some(seed) => EngineBuilder::new().seed(seed).build(),
        None => Engine::new(),
    }
}

/// Parse a format name or babl name.
pub fn parse_format(name: &str) -> Result<PixelFormat> {
    name.parse::<PixelFormat>()
        .with_context(|| format!("Invalid format '{}' (see `pbx formats`)", name))
}

/// Program text from `-e` or `-p`.
pub fn read_program(source: &ProgramSource) -> Result<String> {
    match (&source.expr, &source.program) {
        (Some(expr), _) => Ok(expr.clone()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read program: {}", path.display())),
        (None, None) => bail!("No program given (use -e or -p)"),
    }
}

/// Load a raw buffer of little-endian f64 values.
pub fn load_raw(path: &Path) -> Result<Vec<f64>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to load: {}", path.display()))?;
    decode_raw(&bytes).with_context(|| format!("Invalid raw buffer: {}", path.display()))
}

/// Save a buffer as little-endian f64 values.
pub fn save_raw(path: &Path, data: &[f64]) -> Result<()> {
    std::fs::write(path, encode_raw(data))
        .with_context(|| format!("Failed to save: {}", path.display()))
}

fn decode_raw(bytes: &[u8]) -> Result<Vec<f64>> {
    let chunks = bytes.chunks_exact(8);
    if !chunks.remainder().is_empty() {
        bail!("length {} is not a multiple of 8 bytes", bytes.len());
    }
    let mut data = Vec::with_capacity(bytes.len() / 8);
    for chunk in chunks {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(chunk);
        data.push(f64::from_le_bytes(raw));
    }
    Ok(data)
}

fn encode_raw(data: &[f64]) -> Vec<u8> {
    data.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Format value count for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
