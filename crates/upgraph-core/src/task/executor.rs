//! Executors used by parallel aggregate tasks.
//!
//! The engine never owns an executor's lifetime: callers create the pool,
//! hand it to the tasks that need it, and shut it down themselves.

use crate::error::{Result, UpgradeError};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// A unit of work submitted to an executor.
pub type Job = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Runs jobs, possibly on other threads.
pub trait Executor: Send + Sync {
    /// Submit a job. `name` is used for diagnostics only.
    fn submit(&self, name: &str, job: Job) -> Result<JobHandle>;
}

/// The pending result of a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    name: String,
    result: mpsc::Receiver<Result<()>>,
}

impl JobHandle {
    fn pair(name: &str) -> (mpsc::Sender<Result<()>>, Self) {
        let (tx, rx) = mpsc::channel();
        (
            tx,
            Self {
                name: name.to_string(),
                result: rx,
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Block until the job finishes and return its result.
    ///
    /// A job that panicked, or was dropped unrun, yields
    /// [`UpgradeError::WorkerLost`].
    pub fn join(self) -> Result<()> {
        match self.result.recv() {
            Ok(result) => result,
            Err(_) => Err(UpgradeError::WorkerLost { task: self.name }),
        }
    }
}

/// Runs every job on the submitting thread before `submit` returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn submit(&self, name: &str, job: Job) -> Result<JobHandle> {
        let (tx, handle) = JobHandle::pair(name);
        if let Ok(result) = panic::catch_unwind(AssertUnwindSafe(job)) {
            // The receiver is held by `handle`, so this send cannot fail.
            let _ = tx.send(result);
        }
        Ok(handle)
    }
}

/// Configuration for a [`ThreadPool`].
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of worker threads (at least one).
    pub workers: usize,
    /// Prefix for worker thread names.
    pub thread_name: String,
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, |n| n.get()),
            thread_name: "upgraph-worker".to_string(),
        }
    }
}

impl ThreadPoolConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

type Work = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size pool of worker threads.
///
/// Jobs that block on other jobs of the same pool (nested parallel
/// aggregates) need more workers than nesting levels, or they deadlock.
pub struct ThreadPool {
    sender: Mutex<Option<mpsc::Sender<Work>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

impl ThreadPool {
    /// Spawn the worker threads.
    pub fn new(config: ThreadPoolConfig) -> std::io::Result<Self> {
        let size = config.workers.max(1);
        let (tx, rx) = mpsc::channel::<Work>();
        let rx = Arc::new(Mutex::new(rx));

        let mut workers = Vec::with_capacity(size);
        for index in 0..size {
            let rx = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("{}-{}", config.thread_name, index))
                .spawn(move || worker_loop(&rx))?;
            workers.push(handle);
        }
        debug!(workers = size, "thread pool started");

        Ok(Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Stop accepting jobs, let queued jobs finish and join the workers.
    pub fn shutdown(&self) {
        if self.sender.lock().take().is_none() {
            return;
        }
        let workers: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        for handle in workers {
            if handle.join().is_err() {
                warn!("thread pool worker panicked");
            }
        }
        debug!("thread pool stopped");
    }
}

fn worker_loop(rx: &Mutex<mpsc::Receiver<Work>>) {
    loop {
        let next = rx.lock().recv();
        match next {
            Ok(work) => work(),
            Err(_) => break,
        }
    }
}

impl Executor for ThreadPool {
    fn submit(&self, name: &str, job: Job) -> Result<JobHandle> {
        let (tx, handle) = JobHandle::pair(name);
        let work: Work = Box::new(move || {
            // A panicking job drops `tx`, which the handle sees as a lost worker.
            if let Ok(result) = panic::catch_unwind(AssertUnwindSafe(job)) {
                let _ = tx.send(result);
            }
        });

        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => sender
                .send(work)
                .map_err(|_| UpgradeError::ExecutorShutdown)?,
            None => return Err(UpgradeError::ExecutorShutdown),
        }
        Ok(handle)
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
