//! HTTP connection handling module
//!
//! # Components
//!
//! - [`HttpConnection`]: drives one connection from the first request byte to
//!   the shutdown of the write half:
//!   - Reads and decodes exactly one request
//!   - Answers parse failures with `400 Bad Request`
//!   - Runs the [`Handler`](crate::handler::Handler)
//!   - Answers handler failures with `500 Internal Server Error` when nothing
//!     was written yet
//! - [`ResponseWriter`]: the order-enforcing response writer handed to the handler
//!
//! Every connection serves a single request and then closes; responses carry
//! `Connection: close` by default.

mod http_connection;
mod response_writer;

pub use http_connection::HttpConnection;
pub use response_writer::{ResponseWriter, WriterState};
