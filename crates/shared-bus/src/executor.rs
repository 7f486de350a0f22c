//! # PubSub Executor
//!
//! The bounded worker pool shared by every publisher and subscriber of a
//! component. It is built explicitly and handed to the pool, never created
//! as a side effect of the first publish or subscribe.

use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::MAXIMUM_PUBSUB_THREADS;

/// Name given to every executor thread.
pub const WORKER_THREAD_NAME: &str = "pubsub-worker";

/// A fixed-size pool of worker threads running the transport and the
/// receive callbacks.
pub struct PubSubExecutor {
    runtime: Option<Runtime>,
    handle: Handle,
    threads: usize,
}

impl PubSubExecutor {
    /// Create an executor with [`MAXIMUM_PUBSUB_THREADS`] workers.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the worker threads cannot be spawned.
    pub fn new() -> io::Result<Arc<Self>> {
        Self::with_threads(MAXIMUM_PUBSUB_THREADS)
    }

    /// Create an executor with `threads` workers (at least one).
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the worker threads cannot be spawned.
    pub fn with_threads(threads: usize) -> io::Result<Arc<Self>> {
        let threads = threads.max(1);
        let runtime = Builder::new_multi_thread()
            .worker_threads(threads)
            .max_blocking_threads(threads)
            .thread_name(WORKER_THREAD_NAME)
            .enable_all()
            .build()?;
        let handle = runtime.handle().clone();

        debug!(threads, "PubSub executor started");

        Ok(Arc::new(Self {
            runtime: Some(runtime),
            handle,
            threads,
        }))
    }

    /// Handle for spawning onto the executor.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Number of worker threads.
    #[must_use]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Spawn a task onto the executor.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}

impl std::fmt::Debug for PubSubExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSubExecutor")
            .field("threads", &self.threads)
            .finish()
    }
}

impl Drop for PubSubExecutor {
    fn drop(&mut self) {
        // The last reference may be released on a worker thread, where a
        // blocking runtime shutdown would panic.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
            debug!("PubSub executor stopped");
        }
    }
}
