//! Bounded worker pool for the scan and extraction stages.
//!
//! Each stage hands the pool a batch of independent items. The caller blocks
//! until every item is processed (the stage barrier) or until the timeout
//! expires, in which case the remaining items are cancelled and the stage
//! fails.

use crate::error::{PipelineError, Stage};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub struct WorkerPool {
    pool: ThreadPool,
    threads: usize,
    timeout: Duration,
}

impl WorkerPool {
    pub fn new(threads: usize, timeout: Duration) -> Result<Self, PipelineError> {
        let threads = threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("classprune-worker-{}", i))
            .panic_handler(|_| error!("Worker task panicked"))
            .build()?;

        debug!("Worker pool started with {} threads", threads);

        Ok(Self {
            pool,
            threads,
            timeout,
        })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Run `task` over every item and wait for all of them to finish.
    ///
    /// Returns [`PipelineError::Timeout`] if the batch is not done within the
    /// pool's timeout. Items not yet started at that point are skipped; items
    /// already running are left to finish on their own, and their results
    /// must be discarded by the caller.
    pub fn run<T, F>(&self, stage: Stage, items: Vec<T>, task: F) -> Result<(), PipelineError>
    where
        T: Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = mpsc::channel();

        let flag = Arc::clone(&cancelled);
        let count = items.len();
        self.pool.spawn(move || {
            items.par_iter().for_each(|item| {
                if flag.load(Ordering::Relaxed) {
                    return;
                }
                task(item);
            });
            // Release whatever the task captured before the caller resumes
            drop(task);
            drop(items);
            // The receiver may already be gone after a timeout
            let _ = done_tx.send(());
        });

        match done_rx.recv_timeout(self.timeout) {
            Ok(()) => {
                debug!("{} stage processed {} items", stage, count);
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => {
                cancelled.store(true, Ordering::Relaxed);
                warn!(
                    "{} stage exceeded {}s; cancelling outstanding tasks",
                    stage,
                    self.timeout.as_secs()
                );
                Err(PipelineError::Timeout {
                    stage,
                    secs: self.timeout.as_secs(),
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(PipelineError::WorkerPanicked { stage }),
        }
    }
}
