//! # Publisher
//!
//! Publishing side of the transport: one TCP listener per port, fanning every
//! sent frame out to all connected subscriber sessions.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::executor::PubSubExecutor;
use crate::wire::write_frame;
use crate::{MAX_FRAME_LEN, SESSION_QUEUE_CAPACITY};

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

type Frame = Arc<[u8]>;

/// A bound publisher for one port.
///
/// Dropping it closes the listener and every session.
pub struct Publisher {
    port: u16,
    local_addr: SocketAddr,
    sender: broadcast::Sender<Frame>,
    accept_task: JoinHandle<()>,
}

impl Publisher {
    /// Listen on `0.0.0.0:port` and start accepting subscriber sessions on
    /// the executor. Port `0` binds an ephemeral port, see [`Self::local_addr`].
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the port cannot be bound.
    pub fn bind(executor: &PubSubExecutor, port: u16) -> io::Result<Self> {
        let std_listener = std::net::TcpListener::bind(("0.0.0.0", port))?;
        std_listener.set_nonblocking(true)?;
        let local_addr = std_listener.local_addr()?;

        let listener = {
            let _runtime = executor.handle().enter();
            TcpListener::from_std(std_listener)?
        };

        let (sender, _) = broadcast::channel(SESSION_QUEUE_CAPACITY);
        let accept_task = executor.spawn(accept_sessions(listener, sender.clone()));

        debug!(port, addr = %local_addr, "Publisher bound");

        Ok(Self {
            port,
            local_addr,
            sender,
            accept_task,
        })
    }

    /// Queue `frame` for every connected session.
    ///
    /// Returns `false` if the frame exceeds [`MAX_FRAME_LEN`] or the
    /// publisher stopped accepting (listener failure). Sending while no
    /// subscriber is connected drops the frame and still succeeds.
    pub fn send(&self, frame: &[u8]) -> bool {
        if frame.len() > MAX_FRAME_LEN {
            warn!(
                port = self.port,
                len = frame.len(),
                max = MAX_FRAME_LEN,
                "Frame too large, not sent"
            );
            return false;
        }
        if self.accept_task.is_finished() {
            warn!(port = self.port, "Publisher is no longer running");
            return false;
        }

        match self.sender.send(Arc::from(frame)) {
            Ok(sessions) => trace!(port = self.port, sessions, "Frame queued"),
            Err(_) => trace!(port = self.port, "Frame dropped (no subscribers)"),
        }
        true
    }

    /// The configured port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The address actually bound.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of connected subscriber sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        self.accept_task.abort();
        debug!(port = self.port, "Publisher closed");
    }
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("port", &self.port)
            .field("local_addr", &self.local_addr)
            .field("sessions", &self.session_count())
            .finish()
    }
}

async fn accept_sessions(listener: TcpListener, sender: broadcast::Sender<Frame>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                // Subscribe before spawning so frames sent right after the
                // accept are not lost.
                let frames = sender.subscribe();
                tokio::spawn(serve_session(stream, peer, frames));
            }
            Err(e) => {
                warn!(error = %e, "Failed to accept subscriber session");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

async fn serve_session(
    mut stream: TcpStream,
    peer: SocketAddr,
    mut frames: broadcast::Receiver<Frame>,
) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!(peer = %peer, error = %e, "Unable to disable Nagle");
    }
    debug!(peer = %peer, "Subscriber session opened");

    loop {
        let frame = match frames.recv().await {
            Ok(frame) => frame,
            Err(broadcast::error::RecvError::Closed) => break,
            Err(broadcast::error::RecvError::Lagged(count)) => {
                warn!(peer = %peer, lagged = count, "Subscriber session lagged, frames dropped");
                continue;
            }
        };

        if let Err(e) = write_frame(&mut stream, &frame).await {
            debug!(peer = %peer, error = %e, "Subscriber session closed");
            return;
        }
    }

    debug!(peer = %peer, "Publisher gone, session closed");
}
