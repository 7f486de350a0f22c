//! # Subscriber
//!
//! Subscribing side of the transport. A subscriber owns any number of
//! sessions, each one a TCP connection to a publisher that is re-established
//! whenever it drops. Every received frame goes to the installed callback on
//! an executor thread.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::executor::PubSubExecutor;
use crate::wire::read_frame;

/// Callback receiving raw frames.
pub type FrameCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Delay between connection attempts of a session.
pub const RECONNECT_INTERVAL: Duration = Duration::from_millis(100);

/// A set of sessions sharing one frame callback.
///
/// Dropping it ends every session.
pub struct Subscriber {
    executor: Arc<PubSubExecutor>,
    callback: Arc<RwLock<Option<FrameCallback>>>,
    sessions: Mutex<Vec<JoinHandle<()>>>,
}

impl Subscriber {
    /// Create a subscriber without sessions or callback.
    #[must_use]
    pub fn new(executor: Arc<PubSubExecutor>) -> Self {
        Self {
            executor,
            callback: Arc::new(RwLock::new(None)),
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Install the callback, replacing any previous one.
    ///
    /// Frames received while no callback is installed are discarded.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        *self.callback.write() = Some(Arc::new(callback));
    }

    /// Open a session to the publisher at `host:port`.
    pub fn add_session(&self, host: &str, port: u16) {
        let task = self.executor.spawn(run_session(
            host.to_owned(),
            port,
            Arc::clone(&self.callback),
        ));
        self.sessions.lock().push(task);
    }

    /// Number of sessions opened on this subscriber.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        for session in self.sessions.get_mut().drain(..) {
            session.abort();
        }
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("sessions", &self.session_count())
            .field("has_callback", &self.callback.read().is_some())
            .finish()
    }
}

async fn run_session(host: String, port: u16, callback: Arc<RwLock<Option<FrameCallback>>>) {
    loop {
        match TcpStream::connect((host.as_str(), port)).await {
            Ok(mut stream) => {
                if let Err(e) = stream.set_nodelay(true) {
                    trace!(port, error = %e, "Unable to disable Nagle");
                }
                debug!(host = %host, port, "Subscriber session connected");
                receive_frames(&mut stream, port, &callback).await;
            }
            Err(e) => {
                trace!(host = %host, port, error = %e, "Publisher not reachable yet");
            }
        }

        tokio::time::sleep(RECONNECT_INTERVAL).await;
    }
}

async fn receive_frames(
    stream: &mut TcpStream,
    port: u16,
    callback: &RwLock<Option<FrameCallback>>,
) {
    loop {
        match read_frame(stream).await {
            Ok(Some(frame)) => {
                // Clone out so the lock is not held while user code runs.
                let current = callback.read().clone();
                match current {
                    Some(callback) => callback(&frame),
                    None => trace!(port, "Frame discarded (no callback)"),
                }
            }
            Ok(None) => {
                debug!(port, "Publisher closed the session");
                return;
            }
            Err(e) => {
                warn!(port, error = %e, "Subscriber session reset");
                return;
            }
        }
    }
}
