//! Loopback TCP listener for the hand tracking process
//!
//! One client is served at a time. The accept/read loop runs on its own task
//! and only writes hand state; it never composes or publishes poses.
//!
//! ```text
//! Stopped --start()--> Listening --accept--> Connected
//!                          ^                     |
//!                          +--- close / error ---+
//! Listening/Connected --stop()--> Stopped
//! ```

use handlink_core::{parse_line, HandPair};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::dispatch::dispatch;
use crate::framing::LineBuffer;

/// Port the tracking process connects to
pub const DEFAULT_PORT: u16 = 65432;

/// Pause after a failed accept before trying again
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("Failed to bind 127.0.0.1:{port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("Listener already running on {0}")]
    AlreadyRunning(SocketAddr),
}

/// Listener tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerConfig {
    /// Size of each socket read
    pub read_chunk_bytes: usize,
    /// Longest partial line kept while waiting for its newline
    pub max_line_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            read_chunk_bytes: 2048,
            max_line_bytes: 64 * 1024,
        }
    }
}

/// Running counters, updated by the listener task
#[derive(Debug, Default)]
pub struct ListenerStats {
    connections: AtomicU64,
    lines_applied: AtomicU64,
    lines_ignored: AtomicU64,
    partial_groups: AtomicU64,
    malformed_groups: AtomicU64,
    discarded_bytes: AtomicU64,
}

impl ListenerStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            connections: self.connections.load(Ordering::Relaxed),
            lines_applied: self.lines_applied.load(Ordering::Relaxed),
            lines_ignored: self.lines_ignored.load(Ordering::Relaxed),
            partial_groups: self.partial_groups.load(Ordering::Relaxed),
            malformed_groups: self.malformed_groups.load(Ordering::Relaxed),
            discarded_bytes: self.discarded_bytes.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub connections: u64,
    pub lines_applied: u64,
    pub lines_ignored: u64,
    pub partial_groups: u64,
    pub malformed_groups: u64,
    pub discarded_bytes: u64,
}

/// Hand tracking listener handle
pub struct TrackingListener {
    hands: HandPair,
    config: ListenerConfig,
    stats: Arc<ListenerStats>,
    running: Arc<AtomicBool>,
    shutdown: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl TrackingListener {
    pub fn new(hands: HandPair, config: ListenerConfig) -> Self {
        Self {
            hands,
            config,
            stats: Arc::new(ListenerStats::default()),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: None,
            task: None,
            local_addr: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Bound address while running; useful when started on port 0
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Bind `127.0.0.1:port` and start the accept loop
    pub async fn start(&mut self, port: u16) -> Result<SocketAddr, ListenerError> {
        if let (true, Some(addr)) = (self.is_running(), self.local_addr) {
            return Err(ListenerError::AlreadyRunning(addr));
        }

        let bind_err = |source| ListenerError::Bind { port, source };
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
            .await
            .map_err(bind_err)?;
        let addr = listener.local_addr().map_err(bind_err)?;

        info!(address = %addr, "Listening for hand tracking client");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.running.store(true, Ordering::SeqCst);

        let accept_loop = AcceptLoop {
            listener,
            hands: self.hands.clone(),
            config: self.config.clone(),
            stats: self.stats.clone(),
            running: self.running.clone(),
            shutdown: shutdown_rx,
        };
        self.task = Some(tokio::spawn(accept_loop.run()));
        self.shutdown = Some(shutdown_tx);
        self.local_addr = Some(addr);

        Ok(addr)
    }

    /// Stop the loop, close both sockets, and wait for the task to finish
    ///
    /// Calling this when not running does nothing.
    pub async fn stop(&mut self) {
        // Flag first so the loop cannot go back to accepting.
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        // Waking the loop drops the client stream and the server socket.
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Listener task ended abnormally");
            }
        }

        self.local_addr = None;
        info!("Hand tracking listener stopped");
    }
}

impl Drop for TrackingListener {
    fn drop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            if let Some(shutdown) = self.shutdown.take() {
                let _ = shutdown.send(true);
            }
            if let Some(task) = self.task.take() {
                task.abort();
            }
        }
    }
}

/// How a client session ended
enum SessionEnd {
    Closed,
    Shutdown,
}

/// State owned by the background task
struct AcceptLoop {
    listener: TcpListener,
    hands: HandPair,
    config: ListenerConfig,
    stats: Arc<ListenerStats>,
    running: Arc<AtomicBool>,
    shutdown: watch::Receiver<bool>,
}

impl AcceptLoop {
    async fn run(mut self) {
        debug!("Listener task started");

        while self.running.load(Ordering::SeqCst) {
            debug!("Waiting for client connection");
            let accepted = tokio::select! {
                _ = self.shutdown.changed() => break,
                result = self.listener.accept() => result,
            };

            match accepted {
                Ok((stream, peer)) => {
                    self.stats.connections.fetch_add(1, Ordering::Relaxed);
                    info!(peer = %peer, "Hand tracking client connected");

                    match self.serve(stream).await {
                        Ok(SessionEnd::Closed) => {
                            info!(peer = %peer, "Hand tracking client disconnected");
                        }
                        Ok(SessionEnd::Shutdown) => break,
                        Err(e) => {
                            if self.running.load(Ordering::SeqCst) {
                                warn!(peer = %peer, error = %e, "Receive error, dropping client");
                            }
                        }
                    }
                }
                Err(e) => {
                    if !self.running.load(Ordering::SeqCst) {
                        break;
                    }
                    warn!(error = %e, "Failed to accept connection");
                    tokio::select! {
                        _ = self.shutdown.changed() => break,
                        _ = tokio::time::sleep(ACCEPT_RETRY_DELAY) => {}
                    }
                }
            }
        }

        debug!("Listener task stopped");
    }

    /// Read one client until it closes, errors, or shutdown is signalled
    async fn serve(&mut self, mut stream: TcpStream) -> std::io::Result<SessionEnd> {
        let mut lines = LineBuffer::new(self.config.max_line_bytes);
        let mut chunk = vec![0u8; self.config.read_chunk_bytes.max(1)];

        loop {
            let read = tokio::select! {
                _ = self.shutdown.changed() => return Ok(SessionEnd::Shutdown),
                result = stream.read(&mut chunk) => result?,
            };

            if read == 0 {
                if lines.pending() > 0 {
                    debug!(bytes = lines.pending(), "Discarding unterminated line at disconnect");
                }
                return Ok(SessionEnd::Closed);
            }

            let frames = lines.push(&chunk[..read]);
            if frames.discarded > 0 {
                warn!(
                    bytes = frames.discarded,
                    limit = self.config.max_line_bytes,
                    "Discarding over-long partial line"
                );
                self.stats
                    .discarded_bytes
                    .fetch_add(frames.discarded as u64, Ordering::Relaxed);
            }

            for line in &frames.lines {
                self.handle_line(line);
            }
        }
    }

    fn handle_line(&self, line: &str) {
        trace!(line = %line, "Received line");

        let report = dispatch(&parse_line(line), &self.hands);
        if report.is_ignored() {
            self.stats.lines_ignored.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.stats.lines_applied.fetch_add(1, Ordering::Relaxed);
        self.stats
            .partial_groups
            .fetch_add(report.partial.len() as u64, Ordering::Relaxed);
        self.stats
            .malformed_groups
            .fetch_add(report.malformed.len() as u64, Ordering::Relaxed);
    }
}
