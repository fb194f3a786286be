//! Background generation worker
//!
//! Chunk sampling and collision rebuilds are CPU-bound and can take several
//! milliseconds, so they run on a small dedicated rayon pool. Each submitted
//! job hands back a [`Pending`] handle backed by a one-shot channel; the frame
//! driver waits on it before publishing the result.

use std::sync::Arc;

use crossbeam_channel::{Receiver, bounded};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

use crate::sim::chunk::{Chunk, ChunkLayout};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to build generation pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),
    #[error("generation job ended without a result")]
    Disconnected,
}

/// Result of a job that may still be running
#[derive(Debug)]
pub struct Pending<T> {
    rx: Receiver<T>,
}

impl<T> Pending<T> {
    /// Block until the job finishes
    ///
    /// A job that panicked drops its sender and yields `Disconnected`.
    pub fn wait(self) -> Result<T, WorkerError> {
        self.rx.recv().map_err(|_| WorkerError::Disconnected)
    }
}

/// Thread pool for procedural generation
pub struct GenerationWorker {
    pool: ThreadPool,
}

impl std::fmt::Debug for GenerationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationWorker")
            .field("threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl GenerationWorker {
    pub fn new(threads: usize) -> Result<Self, WorkerError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("slider-gen-{}", i))
            .panic_handler(|_| log::error!("Generation job panicked"))
            .build()?;
        log::debug!("Generation pool started with {} threads", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run a job on the pool
    pub fn submit<T, F>(&self, job: F) -> Pending<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = bounded(1);
        self.pool.spawn(move || {
            // Receiver gone means the caller stopped caring
            let _ = tx.send(job());
        });
        Pending { rx }
    }

    /// Generate chunks in parallel, in the order given
    pub fn generate_chunks(&self, layout: Arc<ChunkLayout>, indices: Vec<i64>) -> Pending<Vec<Chunk>> {
        self.submit(move || {
            indices
                .par_iter()
                .map(|&index| layout.generate(index))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameConfig;

    #[test]
    fn test_submit_and_wait() {
        let worker = GenerationWorker::new(2).unwrap();
        assert_eq!(worker.threads(), 2);
        let pending = worker.submit(|| 6 * 7);
        assert_eq!(pending.wait().unwrap(), 42);
    }

    #[test]
    fn test_panicking_job_reports_disconnected() {
        let worker = GenerationWorker::new(1).unwrap();
        let pending = worker.submit(|| -> u32 { panic!("boom") });
        assert!(matches!(pending.wait(), Err(WorkerError::Disconnected)));

        // Pool still usable
        assert_eq!(worker.submit(|| 1).wait().unwrap(), 1);
    }

    #[test]
    fn test_parallel_chunks_match_serial() {
        let worker = GenerationWorker::new(2).unwrap();
        let layout = Arc::new(ChunkLayout::new(&GameConfig::default(), 1000.0));

        let chunks = worker
            .generate_chunks(Arc::clone(&layout), vec![-1, 0, 1])
            .wait()
            .unwrap();
        let indices: Vec<i64> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![-1, 0, 1]);
        assert_eq!(chunks[1], layout.generate(0));
    }
}
