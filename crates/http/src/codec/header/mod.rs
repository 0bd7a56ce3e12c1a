//! Response head encoding.
//!
//! - [`HeaderEncoder`]: serializes the status line and the header block of a
//!   response into a [`bytes::BytesMut`]
//!
//! Request headers are parsed line by line by
//! [`HeaderTable::parse`](crate::protocol::HeaderTable::parse) instead, since
//! the request parser has to stop and resume between arbitrary reads.

mod header_encoder;

pub use header_encoder::{HeaderEncoder, StatusLine};
