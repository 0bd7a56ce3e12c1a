//! Protocol types shared by the parser, the writer and the connection.
//!
//! # Components
//!
//! - [`HeaderTable`]: case-insensitive header fields with merge-on-duplicate,
//!   plus the line parser used while reading a request
//! - [`Request`], [`RequestLine`], [`Method`]: the parsed request
//! - [`PayloadItem`]: one piece of a streamed (chunked) response body
//! - [`default_headers`], [`reason_phrase`]: response-side helpers
//! - Errors: [`ParseError`], [`WriteError`], [`HttpError`], [`ServerError`]
//!
//! Validity tables (accepted methods, header name characters) are constants;
//! nothing in this module holds shared mutable state.

mod message;
pub use message::PayloadItem;

mod header;
pub use header::HeaderParse;
pub use header::HeaderTable;
pub use header::is_valid_header_key;

mod request;
pub use request::Method;
pub use request::Request;
pub use request::RequestLine;

mod response;
pub use response::default_headers;
pub use response::reason_phrase;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::ServerError;
pub use error::WriteError;

/// Line terminator of every framing line.
pub const CRLF: &str = "\r\n";

/// The only protocol version accepted on the request line.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Position of the first CRLF in `buf`, if any.
#[inline]
pub(crate) fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|window| window == CRLF.as_bytes())
}
