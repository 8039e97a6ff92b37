//! Session-sharded worker pool.
//!
//! # Responsibilities
//! - Run N long-lived worker threads, each owning a private bounded
//!   queue
//! - Route every job for a session id to the same worker
//!   (`session_id % N`), preserving strict per-session FIFO
//! - Report backpressure: `submit` returns `false` without blocking
//!   when the target worker's queue is at capacity
//! - Survive handler faults: a panic is caught at the dispatch
//!   boundary and converted into a best-effort 500
//!
//! # Design Decisions
//! - No shared queue and no shared lock; unrelated sessions never
//!   contend
//! - `stop` is a hard stop: workers are woken and joined, jobs still
//!   queued are dropped
//! - Blocking worker threads, not async tasks: session affinity needs
//!   a fixed thread per shard, and handlers never block on network I/O
//!   (backend calls are callback-based)

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use crate::execution::job::Job;
use crate::observability::metrics;

/// Processes one dequeued job. Implementations must not assume which
/// worker thread invokes them, only that jobs for one session arrive
/// in order on a single thread.
pub trait JobHandler: Send + Sync {
    fn handle(&self, job: Job);
}

/// Anything that accepts jobs. Lets adapter callbacks resubmit into
/// the pool without holding a strong reference cycle.
pub trait JobSink: Send + Sync {
    fn submit(&self, job: Job) -> bool;
}

struct WorkerQueue {
    jobs: Mutex<VecDeque<Job>>,
    cv: Condvar,
}

/// N workers, each with a private bounded deque, mutex, and condvar.
pub struct ShardedPool {
    workers: Vec<Arc<WorkerQueue>>,
    queue_capacity: usize,
    running: Arc<AtomicBool>,
    handler: Arc<dyn JobHandler>,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl ShardedPool {
    /// Create a stopped pool. `workers` must be at least 1 (config
    /// validation enforces this; a zero is clamped defensively).
    pub fn new(workers: usize, queue_capacity: usize, handler: Arc<dyn JobHandler>) -> Self {
        let workers = (0..workers.max(1))
            .map(|_| {
                Arc::new(WorkerQueue {
                    jobs: Mutex::new(VecDeque::new()),
                    cv: Condvar::new(),
                })
            })
            .collect();

        Self {
            workers,
            queue_capacity: queue_capacity.max(1),
            running: Arc::new(AtomicBool::new(false)),
            handler,
            threads: Mutex::new(Vec::new()),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// The worker a session id shards to.
    pub fn worker_index(&self, session_id: u64) -> usize {
        (session_id % self.workers.len() as u64) as usize
    }

    /// Spawn the worker threads. Idempotent.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let mut threads = self.threads.lock().expect("pool thread list poisoned");
        for (index, queue) in self.workers.iter().enumerate() {
            let queue = queue.clone();
            let running = self.running.clone();
            let handler = self.handler.clone();
            let thread = std::thread::Builder::new()
                .name(format!("shortener-worker-{}", index))
                .spawn(move || worker_loop(index, queue, running, handler))
                .expect("failed to spawn worker thread");
            threads.push(thread);
        }

        tracing::info!(workers = self.workers.len(), "Worker pool started");
    }

    /// Hard stop: flip the running flag, wake every worker, join all
    /// threads. Jobs still queued are dropped.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        for queue in &self.workers {
            // The lock is held across the notify so a worker cannot
            // slip between its running check and the wait.
            let _jobs = queue.jobs.lock().expect("worker queue poisoned");
            queue.cv.notify_all();
        }

        let mut threads = self.threads.lock().expect("pool thread list poisoned");
        for thread in threads.drain(..) {
            let _ = thread.join();
        }

        tracing::info!("Worker pool stopped");
    }

    /// Push a job onto its session's worker queue. Returns `false`
    /// without blocking when the pool is stopped or that worker's
    /// queue is at capacity; the caller must shed.
    pub fn submit(&self, job: Job) -> bool {
        if !self.running.load(Ordering::SeqCst) {
            return false;
        }

        let index = self.worker_index(job.session_id);
        let queue = &self.workers[index];
        {
            let mut jobs = queue.jobs.lock().expect("worker queue poisoned");
            if jobs.len() >= self.queue_capacity {
                return false;
            }
            jobs.push_back(job);
        }
        queue.cv.notify_one();
        true
    }
}

impl JobSink for ShardedPool {
    fn submit(&self, job: Job) -> bool {
        ShardedPool::submit(self, job)
    }
}

impl Drop for ShardedPool {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    index: usize,
    queue: Arc<WorkerQueue>,
    running: Arc<AtomicBool>,
    handler: Arc<dyn JobHandler>,
) {
    loop {
        let job = {
            let mut jobs = queue.jobs.lock().expect("worker queue poisoned");
            loop {
                // Checked before popping so a hard stop drops whatever
                // is still queued.
                if !running.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(job) = jobs.pop_front() {
                    break job;
                }
                jobs = queue.cv.wait(jobs).expect("worker queue poisoned");
            }
        };

        let fallback = job.response();
        let session_id = job.session_id;
        let result = catch_unwind(AssertUnwindSafe(|| handler.handle(job)));
        if result.is_err() {
            tracing::error!(worker = index, session_id, "Handler panicked; job abandoned");
            metrics::record_handler_fault();
            if let Some(mut response) = fallback {
                response.set_status(500);
                response.write(b"Internal Server Error");
                response.close();
            }
        }
    }
}
