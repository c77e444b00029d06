//! Buffer driver: fans a compiled program out over pixel partitions.
//!
//! The buffer is cut into contiguous runs of whole pixels. Each partition
//! gets its own [`Interpreter`] (scratch variables and random source) and
//! touches only its own slice, so partitions need no synchronization. The
//! instruction list is shared by reference.
//!
//! With the `parallel` feature partitions run on rayon workers; without it
//! they run one after another on the caller's thread. Results are identical
//! either way for programs that do not read `rand`.

#[cfg(feature = "parallel")]
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::compiler::Program;
use crate::engine::EngineConfig;
use crate::error::{CompileError, EngineError, EngineResult};
use crate::interp::Interpreter;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How a buffer is split into partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioning {
    /// Number of partitions (at least 1).
    pub partitions: usize,
    /// Pixels per partition; the last partition may be shorter.
    pub pixels_per_partition: usize,
}

impl Partitioning {
    /// Plans partitions for `pixel_count` pixels.
    ///
    /// Uses at most `workers` partitions and avoids partitions smaller than
    /// `min_partition_pixels` unless there is only one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pbx_engine::driver::Partitioning;
    ///
    /// let plan = Partitioning::plan(10_000, 4, 1000);
    /// assert_eq!(plan.partitions, 4);
    /// assert_eq!(plan.pixels_per_partition, 2500);
    ///
    /// let plan = Partitioning::plan(1500, 8, 1000);
    /// assert_eq!(plan.partitions, 2);
    /// ```
    pub fn plan(pixel_count: usize, workers: usize, min_partition_pixels: usize) -> Self {
        if pixel_count == 0 {
            return Self {
                partitions: 1,
                pixels_per_partition: 0,
            };
        }
        let by_size = pixel_count.div_ceil(min_partition_pixels.max(1));
        let wanted = workers.max(1).min(by_size).min(pixel_count);
        let pixels_per_partition = pixel_count.div_ceil(wanted);
        Self {
            partitions: pixel_count.div_ceil(pixels_per_partition),
            pixels_per_partition,
        }
    }

    /// Length in values of one partition's slice.
    #[inline]
    pub fn chunk_len(&self, stride: usize) -> usize {
        self.pixels_per_partition * stride
    }
}

/// Worker threads a run fans out to.
///
/// With a non-zero thread count this owns a dedicated rayon pool, built
/// once and shared by clones. Otherwise runs use the global pool.
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    #[cfg(feature = "parallel")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl WorkerPool {
    /// Builds a pool of `threads` workers (0 = global pool).
    ///
    /// A pool that fails to build is logged and replaced by the global one.
    #[cfg(feature = "parallel")]
    pub fn new(threads: usize) -> Self {
        if threads == 0 {
            return Self::default();
        }
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => {
                debug!(threads, "Built worker pool");
                Self {
                    pool: Some(Arc::new(pool)),
                }
            }
            Err(e) => {
                tracing::warn!(
                    "failed to build {}-thread pool, using global pool: {}",
                    threads,
                    e
                );
                Self::default()
            }
        }
    }

    /// Without `parallel` there are no workers to build.
    #[cfg(not(feature = "parallel"))]
    pub fn new(_threads: usize) -> Self {
        Self::default()
    }

    /// Thread count of the dedicated pool, if one was built.
    #[cfg(feature = "parallel")]
    pub fn dedicated_threads(&self) -> Option<usize> {
        self.pool.as_ref().map(|p| p.current_num_threads())
    }

    /// Thread count of the dedicated pool, if one was built.
    #[cfg(not(feature = "parallel"))]
    pub fn dedicated_threads(&self) -> Option<usize> {
        None
    }
}

/// Summary of one driver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    /// Pixels processed.
    pub pixels: usize,
    /// Partitions used.
    pub partitions: usize,
}

/// Runs `program` over every pixel of `buffer`.
///
/// `stride` is the caller's declared channel count; it must equal the
/// program's format. All checks happen before the first write.
pub fn run(
    program: &Program,
    buffer: &mut [f64],
    stride: usize,
    config: &EngineConfig,
    pool: &WorkerPool,
) -> EngineResult<RunStats> {
    let format = program.format();
    trace!(len = buffer.len(), stride, format = %format, "driver::run");

    if format.channels() != stride {
        return Err(CompileError::StrideMismatch {
            format: format.to_string(),
            channels: format.channels(),
            stride,
        }
        .into());
    }

    let pixel_count = buffer.len() / stride;
    if buffer.len() % stride != 0 {
        return Err(EngineError::Precondition {
            expected: pixel_count * stride,
            actual: buffer.len(),
        });
    }

    if pixel_count == 0 || program.is_empty() {
        return Ok(RunStats {
            pixels: pixel_count,
            partitions: 0,
        });
    }

    let plan = Partitioning::plan(pixel_count, workers(config), config.min_partition_pixels);
    debug!(
        pixels = pixel_count,
        partitions = plan.partitions,
        per_partition = plan.pixels_per_partition,
        "Running program"
    );

    execute(program, buffer, stride, plan, config, pool);

    Ok(RunStats {
        pixels: pixel_count,
        partitions: plan.partitions,
    })
}

fn partition_rng(config: &EngineConfig, index: usize) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_entropy(),
    }
}

fn run_partition(
    program: &Program,
    chunk: &mut [f64],
    stride: usize,
    index: usize,
    config: &EngineConfig,
) {
    let mut interp = Interpreter::new(program.instructions(), partition_rng(config, index));
    interp.run_chunk(chunk, stride);
}

#[cfg(feature = "parallel")]
fn workers(config: &EngineConfig) -> usize {
    match config.threads {
        0 => rayon::current_num_threads(),
        n => n,
    }
}

#[cfg(not(feature = "parallel"))]
fn workers(config: &EngineConfig) -> usize {
    config.threads.max(1)
}

#[cfg(feature = "parallel")]
fn execute(
    program: &Program,
    buffer: &mut [f64],
    stride: usize,
    plan: Partitioning,
    config: &EngineConfig,
    pool: &WorkerPool,
) {
    let job = |buffer: &mut [f64]| {
        buffer
            .par_chunks_mut(plan.chunk_len(stride))
            .enumerate()
            .for_each(|(i, chunk)| run_partition(program, chunk, stride, i, config));
    };

    match &pool.pool {
        Some(pool) => pool.install(|| job(buffer)),
        None => job(buffer),
    }
}

#[cfg(not(feature = "parallel"))]
fn execute(
    program: &Program,
    buffer: &mut [f64],
    stride: usize,
    plan: Partitioning,
    config: &EngineConfig,
    _pool: &WorkerPool,
) {
    for (i, chunk) in buffer.chunks_mut(plan.chunk_len(stride)).enumerate() {
        run_partition(program, chunk, stride, i, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbx_core::PixelFormat;

    fn run_with(
        program: &Program,
        buf: &mut [f64],
        stride: usize,
        config: &EngineConfig,
    ) -> EngineResult<RunStats> {
        run(program, buf, stride, config, &WorkerPool::new(config.threads))
    }

    fn config(threads: usize, min: usize) -> EngineConfig {
        EngineConfig {
            threads,
            min_partition_pixels: min,
            seed: Some(1),
        }
    }

    #[test]
    fn test_plan_covers_every_pixel() {
        for pixels in [1, 2, 7, 100, 1023, 4096, 10_001] {
            for workers in [1, 2, 3, 8, 64] {
                let plan = Partitioning::plan(pixels, workers, 1);
                assert!(plan.partitions >= 1);
                assert!(plan.partitions <= workers);
                assert!(plan.pixels_per_partition * plan.partitions >= pixels);
                assert!(plan.pixels_per_partition * (plan.partitions - 1) < pixels);
            }
        }
    }

    #[test]
    fn test_plan_respects_min_size() {
        let plan = Partitioning::plan(100, 16, 4096);
        assert_eq!(plan.partitions, 1);
        assert_eq!(plan.pixels_per_partition, 100);
    }

    #[test]
    fn test_plan_empty() {
        let plan = Partitioning::plan(0, 8, 1);
        assert_eq!(plan.partitions, 1);
        assert_eq!(plan.chunk_len(4), 0);
    }

    #[test]
    fn test_chunks_never_split_pixels() {
        let plan = Partitioning::plan(10, 3, 1);
        assert_eq!(plan.chunk_len(3) % 3, 0);
        assert_eq!(plan.chunk_len(4) % 4, 0);
    }

    #[test]
    fn test_run_visits_every_pixel_once() {
        let program = Program::compile("r + 1", PixelFormat::Rgba).unwrap();
        let mut buf = vec![0.0; 1001 * 4];
        let stats = run_with(&program, &mut buf, 4, &config(4, 10)).unwrap();
        assert_eq!(stats.pixels, 1001);
        assert_eq!(stats.partitions, 4);
        for px in buf.chunks_exact(4) {
            assert_eq!(px, [1.0, 0.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_stride_mismatch_leaves_buffer() {
        let program = Program::compile("r = 1", PixelFormat::Rgba).unwrap();
        let mut buf = vec![0.5; 9];
        let err = run_with(&program, &mut buf, 3, &config(0, 1)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Compile(CompileError::StrideMismatch { channels: 4, stride: 3, .. })
        ));
        assert!(buf.iter().all(|v| *v == 0.5));
    }

    #[test]
    fn test_ragged_buffer_rejected() {
        let program = Program::compile("r = 1", PixelFormat::Rgb).unwrap();
        let mut buf = vec![0.5; 7];
        let err = run_with(&program, &mut buf, 3, &config(0, 1)).unwrap_err();
        assert_eq!(
            err,
            EngineError::Precondition {
                expected: 6,
                actual: 7
            }
        );
        assert!(buf.iter().all(|v| *v == 0.5));
    }

    #[test]
    fn test_empty_inputs() {
        let program = Program::compile("", PixelFormat::Rgba).unwrap();
        let mut buf = vec![0.25; 8];
        let stats = run_with(&program, &mut buf, 4, &config(0, 1)).unwrap();
        assert_eq!(stats.partitions, 0);
        assert!(buf.iter().all(|v| *v == 0.25));

        let program = Program::compile("r = 1", PixelFormat::Rgba).unwrap();
        let stats = run_with(&program, &mut [], 4, &config(0, 1)).unwrap();
        assert_eq!(stats.pixels, 0);
    }

    #[test]
    fn test_worker_pool_default_is_global() {
        assert_eq!(WorkerPool::new(0).dedicated_threads(), None);
        assert_eq!(WorkerPool::default().dedicated_threads(), None);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_worker_pool_built_once_and_shared() {
        let pool = WorkerPool::new(3);
        assert_eq!(pool.dedicated_threads(), Some(3));

        let clone = pool.clone();
        let (a, b) = (pool.pool.as_ref().unwrap(), clone.pool.as_ref().unwrap());
        assert!(Arc::ptr_eq(a, b));

        let program = Program::compile("r + 1", PixelFormat::Rgba).unwrap();
        let mut buf = vec![0.0; 64 * 4];
        for _ in 0..5 {
            run(&program, &mut buf, 4, &config(3, 1), &clone).unwrap();
        }
        assert!(buf.chunks_exact(4).all(|px| px[0] == 5.0));
        assert_eq!(a.install(rayon::current_num_threads), 3);
    }
}
