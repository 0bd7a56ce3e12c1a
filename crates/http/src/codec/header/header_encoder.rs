//! Encoder for the status line and header block of a response.
//!
//! Both pieces are written separately because the
//! [`ResponseWriter`](crate::connection::ResponseWriter) flushes each one to
//! the peer as soon as the handler produces it.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::StatusCode;
use tokio_util::codec::Encoder;

use crate::protocol::{CRLF, HTTP_VERSION, HeaderTable, reason_phrase};

/// Initial buffer size reserved for a header block
const INIT_HEADER_SIZE: usize = 1024;

/// The status line of a response, e.g. `HTTP/1.1 200 OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusLine(pub StatusCode);

/// Encoder for the head of a response.
///
/// Encoding a [`StatusLine`] writes `HTTP/1.1 <code> <reason>\r\n`; encoding a
/// [`HeaderTable`] writes one `<name>: <value>\r\n` line per entry followed by
/// the blank line that separates the head from the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<StatusLine> for HeaderEncoder {
    type Error = io::Error;

    fn encode(&mut self, item: StatusLine, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let StatusLine(status) = item;
        write!(FastWrite(dst), "{HTTP_VERSION} {} {}{CRLF}", status.as_str(), reason_phrase(status))
    }
}

impl<'a> Encoder<&'a HeaderTable> for HeaderEncoder {
    type Error = io::Error;

    fn encode(&mut self, headers: &'a HeaderTable, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        for (name, value) in headers.iter() {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(CRLF.as_bytes());
        }
        dst.put_slice(CRLF.as_bytes());
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// Lets `write!` format straight into the destination buffer.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
