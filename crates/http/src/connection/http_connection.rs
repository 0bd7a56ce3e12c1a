use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::FramedRead;
use tracing::{debug, error, warn};

use crate::codec::RequestDecoder;
use crate::connection::{ResponseWriter, WriterState};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, Request, WriteError, default_headers};
use crate::server::ServerConfig;

/// One HTTP connection: a single request, a single response, then close.
///
/// `HttpConnection` owns both halves of the stream. [`process`](Self::process)
/// reads one request, hands it to the [`Handler`] together with a
/// [`ResponseWriter`] over the write half, and shuts the write half down.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: W,
    read_timeout: Option<Duration>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, &ServerConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: &ServerConfig) -> Self {
        let decoder = RequestDecoder::with_limits(config.max_header_bytes, config.max_body_bytes);
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, config.read_buffer_size),
            writer,
            read_timeout: config.read_timeout,
        }
    }

    /// Serves the connection to completion.
    ///
    /// # Errors
    ///
    /// - [`HttpError::Request`] if the request could not be parsed; unless the
    ///   read itself failed, a `400 Bad Request` is attempted first
    /// - [`HttpError::Timeout`] if no complete request arrived in time
    /// - [`HttpError::Handler`] if the handler failed, after a `500` is
    ///   attempted when nothing was written yet
    ///
    /// A failure to send the `400` or `500` is logged and does not replace
    /// the error that caused it. The write half is shut down on every path
    /// except a transport failure or timeout.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let request = match self.read_request().await {
            Ok(request) => request,
            Err(e) if e.is_transport() => {
                error!(cause = %e, "can't receive request, connection dropped");
                return Err(e);
            }
            Err(e) => {
                error!(cause = %e, "bad request");
                let mut writer = ResponseWriter::new(&mut self.writer);
                if let Err(write_error) = write_error_response(&mut writer, StatusCode::BAD_REQUEST, &e.to_string()).await {
                    error!(cause = %write_error, "can't send bad request response");
                }
                self.shutdown().await;
                return Err(e);
            }
        };

        debug!(method = %request.method(), target = request.target(), body_size = request.body().len(), "request received");

        let mut writer = ResponseWriter::new(&mut self.writer);
        let result = handler.call(&request, &mut writer).await.map_err(HttpError::handler);

        match result {
            Ok(()) if writer.is_done() => {}
            Ok(()) => warn!(state = ?writer.state(), "handler returned before the response was done"),
            Err(e) => {
                error!(cause = %e, "handle request error");
                if writer.state() == WriterState::AwaitingStatusLine
                    && let Err(write_error) = write_error_response(&mut writer, StatusCode::INTERNAL_SERVER_ERROR, "").await
                {
                    error!(cause = %write_error, "can't send internal server error response");
                }
                self.shutdown().await;
                return Err(e);
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn read_request(&mut self) -> Result<Request, HttpError> {
        let next = match self.read_timeout {
            Some(after) => {
                tokio::time::timeout(after, self.framed_read.next()).await.map_err(|_elapsed| HttpError::Timeout { after })?
            }
            None => self.framed_read.next().await,
        };

        match next {
            Some(result) => Ok(result?),
            None => Err(ParseError::IncompleteRequest.into()),
        }
    }

    async fn shutdown(&mut self) {
        if let Err(e) = self.writer.shutdown().await {
            debug!(cause = %e, "shutdown write half");
        }
    }
}

/// Answers with `status`, the default headers and `body`.
async fn write_error_response<W>(writer: &mut ResponseWriter<W>, status: StatusCode, body: &str) -> Result<(), WriteError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_status_line(status).await?;
    writer.write_headers(&default_headers(body.len())).await?;
    writer.write_body(body.as_bytes()).await?;
    Ok(())
}
