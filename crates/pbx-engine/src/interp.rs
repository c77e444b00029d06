//! Per-pixel interpreter.
//!
//! An [`Interpreter`] owns the scratch variables and the random source for
//! one partition of the buffer. It binds to one pixel at a time, runs every
//! instruction in order against that pixel's channel slots, and leaves the
//! channel values in place. Nothing outside the bound pixel is reachable.

use rand::Rng;

use crate::compiler::{Instruction, Operand, Target};
use crate::op::Shape;
use crate::symbol::{Constant, VARIABLES};

/// Executes a compiled instruction list pixel by pixel.
///
/// Variables are zeroed before every pixel, so a read of a variable the
/// program has not yet written in this pixel yields `0.0`.
///
/// # Example
///
/// ```rust
/// use pbx_core::PixelFormat;
/// use pbx_engine::{compiler::Program, interp::Interpreter};
///
/// let program = Program::compile("r sqrt r", PixelFormat::Rgba).unwrap();
/// let mut interp = Interpreter::new(program.instructions(), rand::thread_rng());
/// let mut pixel = [4.0, 0.0, 0.0, 0.0];
/// interp.run_pixel(&mut pixel);
/// assert_eq!(pixel[0], 2.0);
/// ```
pub struct Interpreter<'p, R> {
    instructions: &'p [Instruction],
    vars: [f64; VARIABLES],
    rng: R,
}

impl<'p, R: Rng> Interpreter<'p, R> {
    /// Creates an interpreter with its own random source.
    pub fn new(instructions: &'p [Instruction], rng: R) -> Self {
        Self {
            instructions,
            vars: [0.0; VARIABLES],
            rng,
        }
    }

    /// Scratch variables as left by the last pixel.
    #[inline]
    pub fn vars(&self) -> &[f64; VARIABLES] {
        &self.vars
    }

    /// Runs the program on one pixel, mutating its channels in place.
    ///
    /// `pixel` must hold at least as many channels as the program's format.
    #[inline]
    pub fn run_pixel(&mut self, pixel: &mut [f64]) {
        self.vars = [0.0; VARIABLES];

        for inst in self.instructions {
            let operand = match inst.operand {
                Operand::Channel(i) => pixel[i],
                Operand::Variable(i) => self.vars[i],
                Operand::Literal(n) => n,
                Operand::Constant(Constant::Pi) => std::f64::consts::PI,
                Operand::Constant(Constant::E) => std::f64::consts::E,
                Operand::Constant(Constant::Rand) => self.rng.r#gen::<f64>(),
            };

            let slot = match inst.target {
                Target::Channel(i) => &mut pixel[i],
                Target::Variable(i) => &mut self.vars[i],
            };

            *slot = match inst.op.shape() {
                Shape::Assign => operand,
                Shape::Compound | Shape::Unary => inst.op.eval(*slot, operand),
            };
        }
    }

    /// Runs the program over a contiguous run of whole pixels.
    ///
    /// `pixels.len()` must be a multiple of `stride`.
    pub fn run_chunk(&mut self, pixels: &mut [f64], stride: usize) {
        for pixel in pixels.chunks_exact_mut(stride) {
            self.run_pixel(pixel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::Program;
    use approx::assert_relative_eq;
    use pbx_core::PixelFormat;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn run(src: &str, format: PixelFormat, pixels: &mut [f64]) {
        let program = Program::compile(src, format).unwrap();
        let mut interp = Interpreter::new(program.instructions(), StdRng::seed_from_u64(7));
        interp.run_chunk(pixels, format.channels());
    }

    #[test]
    fn test_compound_add() {
        let mut px = [0.2, 0.4, 0.6, 1.0];
        run("r + 0.1", PixelFormat::Rgba, &mut px);
        assert_relative_eq!(px[0], 0.3, epsilon = 1e-12);
        assert_eq!(&px[1..], &[0.4, 0.6, 1.0]);
    }

    #[test]
    fn test_variables_carry_between_statements() {
        let mut px = [50.0, 20.0, 90.0, 1.0];
        run("v = l\nv / 100\nc * v", PixelFormat::Lcha, &mut px);
        assert_relative_eq!(px[1], 10.0);
        assert_eq!(px[0], 50.0);
        assert_eq!(px[2], 90.0);
        assert_eq!(px[3], 1.0);
    }

    #[test]
    fn test_unary_reads_only_operand() {
        let mut px = [9.0, 16.0, 0.0, 0.0];
        run("r sqrt g", PixelFormat::Rgba, &mut px);
        assert_eq!(px[0], 4.0);
    }

    #[test]
    fn test_variables_reset_per_pixel() {
        let mut px = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];
        run("v + r\ng = v", PixelFormat::Rgba, &mut px);
        assert_eq!(px[1], 1.0);
        assert_eq!(px[5], 1.0);
    }

    #[test]
    fn test_unwritten_variable_reads_zero() {
        let mut px = [5.0, 5.0, 5.0];
        run("r = v9", PixelFormat::Rgb, &mut px);
        assert_eq!(px[0], 0.0);
    }

    #[test]
    fn test_variables_not_written_back() {
        let program = Program::compile("v2 = 3\nr + v2", PixelFormat::Rgb).unwrap();
        let mut interp = Interpreter::new(program.instructions(), StdRng::seed_from_u64(1));
        let mut px = [1.0, 1.0, 1.0];
        interp.run_pixel(&mut px);
        assert_eq!(px, [4.0, 1.0, 1.0]);
        assert_eq!(interp.vars()[1], 3.0);
    }

    #[test]
    fn test_constants() {
        let mut px = [0.0, 0.0, 0.0, 0.0];
        run("r = pi\ng = e", PixelFormat::Rgba, &mut px);
        assert_eq!(px[0], std::f64::consts::PI);
        assert_eq!(px[1], std::f64::consts::E);
    }

    #[test]
    fn test_rand_resampled_per_use() {
        let mut px = [0.0; 4];
        run("r = rand\ng = rand\nb = rand", PixelFormat::Rgba, &mut px);
        for v in &px[..3] {
            assert!((0.0..1.0).contains(v));
        }
        assert!(px[0] != px[1] || px[1] != px[2]);
    }

    #[test]
    fn test_division_by_zero_is_not_an_error() {
        let mut px = [1.0, 0.0, 0.0, 0.0];
        run("r / 0", PixelFormat::Rgba, &mut px);
        assert_eq!(px[0], f64::INFINITY);

        let mut px = [0.0, 0.0, 0.0, 0.0];
        run("r / 0", PixelFormat::Rgba, &mut px);
        assert!(px[0].is_nan());
    }

    #[test]
    fn test_self_reference_in_unary() {
        let mut px = [-2.5, 0.0, 0.0, 0.0];
        run("r abs r\nr floor r", PixelFormat::Rgba, &mut px);
        assert_eq!(px[0], 2.0);
    }
}
