//! HTTP codec module for decoding requests and encoding responses
//!
//! This module contains everything that turns bytes into protocol values and
//! back, without performing any I/O itself.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestParser`]: the single-step request state machine
//!   - [`RequestDecoder`]: drives the parser over a [`bytes::BytesMut`] as a
//!     [`tokio_util::codec::Decoder`]
//!   - [`parse_request_line`]: the request line grammar
//!
//! - Response handling:
//!   - [`HeaderEncoder`]: status line and header block
//!   - [`ChunkedEncoder`]: chunked transfer coding
//!
//! # Example
//!
//! ```no_run
//! use tcp_http::codec::read_request;
//!
//! # async fn run(stream: tokio::net::TcpStream) -> Result<(), tcp_http::protocol::ParseError> {
//! let request = read_request(stream).await?;
//! println!("{} {}", request.method(), request.target());
//! # Ok(())
//! # }
//! ```

mod body;
mod header;
mod request_decoder;
mod request_line;

pub use body::ChunkedEncoder;
pub use header::{HeaderEncoder, StatusLine};
pub use request_decoder::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEADER_BYTES, ParseState, RequestDecoder, RequestParser, read_request};
pub use request_line::parse_request_line;
