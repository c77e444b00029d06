//! Ready-made programs for common LCH and HSL adjustments.
//!
//! Presets are plain program text plus the format they expect; they go
//! through the same compiler as user programs.
//!
//! # Example
//!
//! ```rust
//! use pbx_engine::{apply, presets};
//!
//! let preset = presets::filmic_saturation();
//! let mut px = [50.0, 40.0, 90.0, 1.0];
//! apply(&preset.program, preset.format, &mut px, 1).unwrap();
//! assert_eq!(px[1], 20.0);
//! ```

use pbx_core::PixelFormat;

use crate::compiler::Program;
use crate::error::CompileResult;

/// Named program bound to a format.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    /// Preset name.
    pub name: &'static str,
    /// Format the program is written for.
    pub format: PixelFormat,
    /// Program text.
    pub program: String,
}

impl Preset {
    /// Compiles the preset.
    pub fn compile(&self) -> CompileResult<Program> {
        Program::compile(&self.program, self.format)
    }
}

/// Range of the `scale` parameter of [`filmic_chroma`].
pub const FILMIC_SCALE: (f64, f64) = (0.1, 1.0);

/// Range of the `offset` parameter of [`filmic_chroma`].
pub const FILMIC_OFFSET: (f64, f64) = (0.0, 1.0);

fn clamp_param(value: f64, (lo, hi): (f64, f64)) -> f64 {
    if value.is_nan() { lo } else { value.clamp(lo, hi) }
}

/// Names accepted by [`by_name`].
pub const NAMES: [&str; 3] = ["filmic-chroma", "filmic-saturation", "invert-lightness"];

/// Chroma scaled by lightness, like a filmic tonemapper's desaturation.
///
/// `scale` (0.1..=1) sets how fast chroma falls with lightness, `offset`
/// (0..=1) is a flat chroma boost. `invert` makes dark colors lose chroma
/// instead of light ones. Per pixel:
/// `c *= (1 + offset) - l' * scale / 100`, with `l' = l` or `100 - l`.
///
/// Parameters are clamped to their ranges (NaN takes the low end), so the
/// generated text always compiles.
pub fn filmic_chroma(scale: f64, offset: f64, invert: bool) -> Preset {
    let scale = clamp_param(scale, FILMIC_SCALE);
    let offset = clamp_param(offset, FILMIC_OFFSET);
    let divisor = 100.0 / scale;
    let mut program = String::new();
    program.push_str(&format!("v1 = {}\n", 1.0 + offset));
    if invert {
        program.push_str("v2 = 100\nv2 - l\n");
    } else {
        program.push_str("v2 = l\n");
    }
    program.push_str(&format!("v2 / {divisor}\nv1 - v2\nc * v1\n"));
    Preset {
        name: "filmic-chroma",
        format: PixelFormat::Lcha,
        program,
    }
}

/// Chroma reduced in proportion to lightness: `c = c - l * c / 100`.
pub fn filmic_saturation() -> Preset {
    Preset {
        name: "filmic-saturation",
        format: PixelFormat::Lcha,
        program: "v1 = l\nv1 * c\nv1 / 100\nc - v1\n".to_string(),
    }
}

/// Flips HSL lightness: `l = 1 - l`.
pub fn invert_lightness() -> Preset {
    Preset {
        name: "invert-lightness",
        format: PixelFormat::Hsla,
        program: "v1 = l\nl = 1\nl - v1\n".to_string(),
    }
}

/// Looks up a preset by name with default parameters.
pub fn by_name(name: &str) -> Option<Preset> {
    match name {
        "filmic-chroma" => Some(filmic_chroma(1.0, 0.25, false)),
        "filmic-saturation" => Some(filmic_saturation()),
        "invert-lightness" => Some(invert_lightness()),
        _ => None,
    }
}
