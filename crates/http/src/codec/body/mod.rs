//! Response body encoding.
//!
//! - [`ChunkedEncoder`]: chunked transfer coding for bodies whose length is
//!   not known up front
//!
//! Fixed-length bodies need no framing and are copied verbatim by the
//! [`ResponseWriter`](crate::connection::ResponseWriter). Requests only carry
//! `Content-Length` bodies, which the request parser accumulates itself.

mod chunked_encoder;

pub use chunked_encoder::ChunkedEncoder;
