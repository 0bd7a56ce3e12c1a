use std::io;

use bytes::{Bytes, BytesMut};
use http::StatusCode;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::debug;

use crate::codec::{ChunkedEncoder, HeaderEncoder, StatusLine};
use crate::ensure;
use crate::protocol::{HeaderTable, PayloadItem, WriteError};

const INIT_BUFFER_SIZE: usize = 1024;

/// Position of a [`ResponseWriter`] in the response it is producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    AwaitingStatusLine,
    AwaitingHeaders,
    AwaitingBody,
    Done,
}

/// Writes one response to `W`, enforcing the order status line, headers, body.
///
/// Every method checks the state before touching the sink, so a call out of
/// order fails with [`WriteError::InvalidWriterState`] and writes nothing. A
/// successful call hands its bytes to the sink and flushes it before returning.
/// The state only advances when the write succeeded.
///
/// # Example
///
/// ```
/// use http::StatusCode;
/// use tcp_http::connection::ResponseWriter;
/// use tcp_http::protocol::HeaderTable;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), tcp_http::protocol::WriteError> {
/// let mut writer = ResponseWriter::new(Vec::new());
/// writer.write_status_line(StatusCode::OK).await?;
/// writer.write_headers(&HeaderTable::new()).await?;
/// writer.write_body(b"ok").await?;
///
/// assert_eq!(writer.into_inner(), b"HTTP/1.1 200 OK\r\n\r\nok");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ResponseWriter<W> {
    writer: W,
    buffer: BytesMut,
    state: WriterState,
    status_line: Bytes,
    headers: HeaderTable,
    chunked: ChunkedEncoder,
}

impl<W> ResponseWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: BytesMut::with_capacity(INIT_BUFFER_SIZE),
            state: WriterState::AwaitingStatusLine,
            status_line: Bytes::new(),
            headers: HeaderTable::new(),
            chunked: ChunkedEncoder::new(),
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == WriterState::Done
    }

    /// The status line as written, CRLF included; empty before it was written.
    pub fn status_line(&self) -> &Bytes {
        &self.status_line
    }

    /// The header table as written; empty before the headers were written.
    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes `HTTP/1.1 <code> <reason>\r\n`.
    ///
    /// # Errors
    ///
    /// [`WriteError::InvalidWriterState`] unless nothing was written yet,
    /// [`WriteError::WritingStatusLine`] if the sink fails.
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        self.expect_state(WriterState::AwaitingStatusLine)?;

        let result = HeaderEncoder.encode(StatusLine(status), &mut self.buffer);
        let status_line = self.buffer.clone().freeze();
        self.flush_with(result).await.map_err(|source| WriteError::WritingStatusLine { source })?;

        self.status_line = status_line;
        self.advance(WriterState::AwaitingHeaders);
        Ok(())
    }

    /// Writes every entry of `headers` followed by the blank line ending the header block.
    ///
    /// # Errors
    ///
    /// [`WriteError::InvalidWriterState`] unless the status line was written,
    /// [`WriteError::WritingHeaders`] if the sink fails.
    pub async fn write_headers(&mut self, headers: &HeaderTable) -> Result<(), WriteError> {
        self.expect_state(WriterState::AwaitingHeaders)?;

        let result = HeaderEncoder.encode(headers, &mut self.buffer);
        self.flush_with(result).await.map_err(|source| WriteError::WritingHeaders { source })?;

        self.headers = headers.clone();
        self.advance(WriterState::AwaitingBody);
        Ok(())
    }

    /// Writes `body` verbatim and completes the response.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// [`WriteError::InvalidWriterState`] unless the headers were written,
    /// [`WriteError::WritingBody`] if the sink fails.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriterState::AwaitingBody)?;

        self.writer.write_all(body).await.map_err(|source| WriteError::WritingBody { source })?;
        self.writer.flush().await.map_err(|source| WriteError::WritingBody { source })?;

        self.advance(WriterState::Done);
        Ok(body.len())
    }

    /// Writes `chunk` as one chunk of a chunked body; may be called repeatedly.
    ///
    /// Returns the number of bytes written on the wire, framing included. An
    /// empty chunk writes nothing, finish the body with
    /// [`write_chunked_body_done`](Self::write_chunked_body_done) instead.
    ///
    /// # Errors
    ///
    /// [`WriteError::InvalidWriterState`] unless the headers were written and
    /// the body is not finished, [`WriteError::WritingChunkedBody`] if the sink fails.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, WriteError> {
        self.expect_state(WriterState::AwaitingBody)?;

        let result = self.chunked.encode(PayloadItem::Chunk(chunk), &mut self.buffer);
        self.flush_with(result).await.map_err(|source| WriteError::WritingChunkedBody { source })
    }

    /// Writes the terminating `0\r\n\r\n` of a chunked body and completes the response.
    ///
    /// # Errors
    ///
    /// [`WriteError::InvalidWriterState`] unless the headers were written,
    /// [`WriteError::WritingChunkedBody`] if the sink fails.
    pub async fn write_chunked_body_done(&mut self) -> Result<(), WriteError> {
        self.expect_state(WriterState::AwaitingBody)?;

        let result = self.chunked.encode(PayloadItem::<&[u8]>::Eof, &mut self.buffer);
        self.flush_with(result).await.map_err(|source| WriteError::WritingChunkedBody { source })?;

        debug!(body_size = self.chunked.send_size(), "chunked body done");
        self.advance(WriterState::Done);
        Ok(())
    }

    fn expect_state(&self, expected: WriterState) -> Result<(), WriteError> {
        ensure!(self.state == expected, WriteError::invalid_state(self.state, expected));
        Ok(())
    }

    fn advance(&mut self, next: WriterState) {
        debug!(from = ?self.state, to = ?next, "response writer state");
        self.state = next;
    }

    /// Sends whatever an encoder left in the buffer; the buffer is empty afterwards.
    async fn flush_with(&mut self, encoded: io::Result<()>) -> io::Result<usize> {
        if let Err(e) = encoded {
            self.buffer.clear();
            return Err(e);
        }

        let len = self.buffer.len();
        let result = self.write_buffer().await;
        self.buffer.clear();
        result.map(|()| len)
    }

    async fn write_buffer(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.writer.write_all(&self.buffer).await?;
        self.writer.flush().await
    }
}
