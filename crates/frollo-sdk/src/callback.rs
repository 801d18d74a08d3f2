//! Where completion callbacks run.
//!
//! Refreshes execute on the SDK worker pool. Their completions are handed to
//! a [`CallbackContext`] chosen by the host: run inline on the worker, queued
//! for the host's main thread, or spawned on a runtime the host owns.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::runtime::Handle;

/// A completion ready to run.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

pub trait CallbackContext: Send + Sync {
    fn dispatch(&self, job: Job);
}

/// Runs completions directly on the worker that finished the refresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineContext;

impl CallbackContext for InlineContext {
    fn dispatch(&self, job: Job) {
        job();
    }
}

/// Queues completions until the host drains them, typically from its main
/// or UI thread.
#[derive(Clone, Default)]
pub struct MainThreadQueue {
    jobs: Arc<Mutex<VecDeque<Job>>>,
}

impl MainThreadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every queued completion on the calling thread. Returns how many ran.
    pub fn drain(&self) -> usize {
        let mut ran = 0;
        // Take jobs one by one so a completion may enqueue more work.
        loop {
            let next = self.jobs.lock().pop_front();
            match next {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.jobs.lock().len()
    }
}

impl CallbackContext for MainThreadQueue {
    fn dispatch(&self, job: Job) {
        self.jobs.lock().push_back(job);
    }
}

/// Spawns completions onto a tokio runtime owned by the host.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    handle: Handle,
}

impl RuntimeContext {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl CallbackContext for RuntimeContext {
    fn dispatch(&self, job: Job) {
        self.handle.spawn(async move { job() });
    }
}
