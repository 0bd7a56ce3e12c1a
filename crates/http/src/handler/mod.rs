//! Request handler abstraction.
//!
//! A [`Handler`] receives the fully parsed [`Request`] together with the
//! [`ResponseWriter`] of its connection and drives the writer through the
//! response it wants to send.

use std::error::Error;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::connection::ResponseWriter;
use crate::protocol::Request;

/// Produces the response for one request.
///
/// The handler owns the writer for the duration of the call. Returning an
/// error before the status line was written makes the connection answer
/// `500 Internal Server Error`; an error after that only closes the connection.
///
/// # Example
///
/// ```
/// use async_trait::async_trait;
/// use http::StatusCode;
/// use tcp_http::connection::ResponseWriter;
/// use tcp_http::handler::Handler;
/// use tcp_http::protocol::{Request, WriteError, default_headers};
/// use tokio::io::AsyncWrite;
///
/// struct Hello;
///
/// #[async_trait]
/// impl Handler for Hello {
///     type Error = WriteError;
///
///     async fn call<W>(&self, _request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
///     where
///         W: AsyncWrite + Unpin + Send,
///     {
///         let body = b"Hello World!\n";
///         writer.write_status_line(StatusCode::OK).await?;
///         writer.write_headers(&default_headers(body.len())).await?;
///         writer.write_body(body).await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send + Sync {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call<W>(&self, request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
    where
        W: AsyncWrite + Unpin + Send;
}
