//! Engine configuration and the configured entry points.
//!
//! # Configuration
//!
//! Use [`EngineBuilder`] for control over partitioning and `rand`:
//!
//! ```rust
//! use pbx_core::PixelFormat;
//! use pbx_engine::EngineBuilder;
//!
//! let engine = EngineBuilder::new()
//!     .threads(2)
//!     .min_partition_pixels(1)
//!     .seed(42)
//!     .build();
//!
//! let mut pixels = vec![0.5; 4 * 16];
//! let stats = engine.apply("g = rand", PixelFormat::Rgba, &mut pixels, 16).unwrap();
//! assert_eq!(stats.partitions, 2);
//! ```

use pbx_core::PixelFormat;
use tracing::trace;

use crate::compiler::Program;
use crate::driver::{self, RunStats, WorkerPool};
use crate::error::{EngineError, EngineResult};

/// Default lower bound on pixels per partition.
pub const DEFAULT_MIN_PARTITION_PIXELS: usize = 4096;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker count (0 = every rayon worker).
    pub threads: usize,
    /// Smallest partition worth its own worker.
    pub min_partition_pixels: usize,
    /// Seed for `rand` (None = seeded from entropy).
    ///
    /// Partition `i` uses `seed + i`, so seeded output is reproducible for
    /// a fixed partition count.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            min_partition_pixels: DEFAULT_MIN_PARTITION_PIXELS,
            seed: None,
        }
    }
}

/// Builder for [`Engine`].
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
}

impl EngineBuilder {
    /// Create new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set worker count (0 = auto).
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = threads;
        self
    }

    /// Set the smallest partition size in pixels (at least 1).
    pub fn min_partition_pixels(mut self, pixels: usize) -> Self {
        self.config.min_partition_pixels = pixels.max(1);
        self
    }

    /// Seed `rand` for reproducible output.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the Engine, spawning its worker pool when `threads > 0`.
    pub fn build(self) -> Engine {
        Engine::with_config(self.config)
    }
}

/// Configured engine.
///
/// Holds no state between calls beyond its configuration and worker pool.
/// Clones share the pool.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    pool: WorkerPool,
}

impl Engine {
    /// Engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        let pool = WorkerPool::new(config.threads);
        Self { config, pool }
    }

    /// Create a builder.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Current configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Checks the buffer, compiles `source` and runs it over every pixel.
    ///
    /// Buffer length is validated before compilation; on any error the
    /// buffer is untouched.
    pub fn apply(
        &self,
        source: &str,
        format: PixelFormat,
        buffer: &mut [f64],
        pixel_count: usize,
    ) -> EngineResult<RunStats> {
        trace!(format = %format, pixel_count, len = buffer.len(), "engine::apply");
        check_buffer(format.channels(), buffer.len(), pixel_count)?;
        let program = Program::compile(source, format)?;
        self.run(&program, buffer)
    }

    /// Runs a compiled program over a buffer in the program's format.
    pub fn run(&self, program: &Program, buffer: &mut [f64]) -> EngineResult<RunStats> {
        driver::run(
            program,
            buffer,
            program.format().channels(),
            &self.config,
            &self.pool,
        )
    }

    /// Runs a compiled program over a buffer with a caller-declared stride.
    ///
    /// A stride that differs from the program's format is a compile error.
    pub fn run_strided(
        &self,
        program: &Program,
        buffer: &mut [f64],
        stride: usize,
    ) -> EngineResult<RunStats> {
        driver::run(program, buffer, stride, &self.config, &self.pool)
    }
}

/// Validates `len == pixel_count * channels` without overflow.
pub fn check_buffer(channels: usize, len: usize, pixel_count: usize) -> EngineResult<()> {
    let expected = pixel_count
        .checked_mul(channels)
        .ok_or(EngineError::SizeOverflow {
            pixels: pixel_count,
            channels,
        })?;
    if len != expected {
        return Err(EngineError::Precondition {
            expected,
            actual: len,
        });
    }
    Ok(())
}
