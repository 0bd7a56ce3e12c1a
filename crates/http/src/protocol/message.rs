use bytes::{Buf, Bytes};

/// One piece of a streamed body.
///
/// The chunked encoder turns every `Chunk` into a length-prefixed frame and
/// `Eof` into the terminating zero-length frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}
