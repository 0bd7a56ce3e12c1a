//! TCP server owning the accept loop.
//!
//! [`Server::bind`] opens the listener, [`Server::serve`] moves it into a
//! background task that spawns one [`HttpConnection`] per accepted socket.
//! The returned [`ServerHandle`] stops the accept loop; connections already
//! accepted are left to finish on their own.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::select;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::codec::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEADER_BYTES};
use crate::connection::HttpConnection;
use crate::handler::Handler;
use crate::protocol::ServerError;

const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-connection settings applied by the [`Server`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Initial capacity of the read buffer; it grows as needed.
    pub read_buffer_size: usize,
    /// Limit for the request line plus header block.
    pub max_header_bytes: usize,
    /// Limit for a declared `Content-Length`.
    pub max_body_bytes: usize,
    /// Time allowed for a complete request to arrive, `None` waits forever.
    pub read_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

impl ServerConfig {
    pub fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }

    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Option<Duration>) -> Self {
        self.read_timeout = read_timeout;
        self
    }
}

/// A bound listener that has not started accepting yet.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Binds the listening socket.
    ///
    /// # Errors
    ///
    /// [`ServerError::Listener`] if the address can't be bound.
    pub async fn bind<A: ToSocketAddrs>(address: A, config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(address).await.map_err(|source| ServerError::Listener { source })?;
        Ok(Self { listener, config: Arc::new(config) })
    }

    /// The address actually bound, useful after binding port `0`.
    ///
    /// # Errors
    ///
    /// [`ServerError::Listener`] if the socket can't report its address.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(|source| ServerError::Listener { source })
    }

    /// Starts the accept loop on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// [`ServerError::Listener`] if the socket can't report its address.
    pub fn serve<H>(self, handler: Arc<H>) -> Result<ServerHandle, ServerError>
    where
        H: Handler + 'static,
    {
        let local_addr = self.local_addr()?;
        let closed = Arc::new(AtomicBool::new(false));
        let shutdown = Arc::new(Notify::new());

        info!(%local_addr, "start listening");
        let task = tokio::spawn(accept_loop(self, handler, Arc::clone(&closed), Arc::clone(&shutdown)));

        Ok(ServerHandle { local_addr, closed, shutdown, task: Some(task) })
    }
}

async fn accept_loop<H>(server: Server, handler: Arc<H>, closed: Arc<AtomicBool>, shutdown: Arc<Notify>)
where
    H: Handler + 'static,
{
    let Server { listener, config } = server;

    loop {
        let (tcp_stream, remote_addr) = select! {
            () = shutdown.notified() => break,
            accepted = listener.accept() => match accepted {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) if closed.load(Ordering::Acquire) => {
                    info!(cause = %e, "accept failed after close");
                    break;
                }
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            },
        };

        if closed.load(Ordering::Acquire) {
            break;
        }

        let handler = Arc::clone(&handler);
        let config = Arc::clone(&config);

        tokio::spawn(async move {
            let (reader, writer) = tcp_stream.into_split();
            let connection = HttpConnection::with_config(reader, writer, &config);
            match connection.process(handler).await {
                Ok(()) => {
                    info!(%remote_addr, "finished process, connection shutdown");
                }
                Err(e) => {
                    error!(%remote_addr, cause = %e, "service has error, connection shutdown");
                }
            }
        });
    }

    info!("stop listening");
}

/// Controls a running accept loop.
///
/// Dropping the handle leaves the server running until the runtime shuts down.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    task: Option<JoinHandle<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops accepting connections and waits for the listener to be released.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AlreadyClosed`] on every call after the first
    /// - [`ServerError::Close`] if the accept loop panicked
    pub async fn close(&mut self) -> Result<(), ServerError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(ServerError::AlreadyClosed);
        }

        self.shutdown.notify_one();
        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(())
    }
}
