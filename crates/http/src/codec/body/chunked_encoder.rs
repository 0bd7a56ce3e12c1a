use std::io;
use std::io::Write;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{CRLF, PayloadItem};

/// Terminating frame of a chunked body.
const LAST_CHUNK: &[u8] = b"0\r\n\r\n";

/// Encodes body pieces with chunked transfer coding.
///
/// Each [`PayloadItem::Chunk`] becomes `<hex size>\r\n<bytes>\r\n` and
/// [`PayloadItem::Eof`] becomes `0\r\n\r\n`. Items after `Eof` are ignored.
/// An empty chunk is skipped, since on the wire it would read as the end of
/// the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
    send_size: usize,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body bytes encoded so far, framing excluded.
    pub fn send_size(&self) -> usize {
        self.send_size
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = io::Error;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(bytes) => {
                let size = bytes.remaining();
                if size == 0 {
                    return Ok(());
                }

                write!(helper::Writer(dst), "{size:x}{CRLF}")?;
                dst.reserve(size + CRLF.len());
                let mut bytes = bytes;
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(len);
                }
                dst.extend_from_slice(CRLF.as_bytes());
                self.send_size += size;
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(LAST_CHUNK);
                Ok(())
            }
        }
    }
}

mod helper {
    use bytes::{BufMut, BytesMut};
    use std::io;

    pub struct Writer<'a>(pub &'a mut BytesMut);

    impl io::Write for Writer<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.put_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn encodes_chunks_and_terminator() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"hello")), &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::from(vec![b'x'; 26])), &mut dst).unwrap();
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();

        let mut expected = b"5\r\nhello\r\n1a\r\n".to_vec();
        expected.extend_from_slice(&[b'x'; 26]);
        expected.extend_from_slice(b"\r\n0\r\n\r\n");
        assert_eq!(&dst[..], &expected[..]);
        assert_eq!(encoder.send_size(), 31);
    }

    #[test]
    fn empty_chunk_is_skipped() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();
        encoder.encode(PayloadItem::Chunk(Bytes::new()), &mut dst).unwrap();
        assert!(dst.is_empty());
    }

    #[test]
    fn nothing_after_eof() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"late")), &mut dst).unwrap();
        assert_eq!(&dst[..], b"0\r\n\r\n");
    }
}
