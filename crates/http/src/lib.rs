//! HTTP/1.1 over raw byte streams
//!
//! This crate reads one HTTP/1.1 request from any [`tokio::io::AsyncRead`],
//! hands it to a request handler, and lets the handler write the response
//! through an order-enforcing writer over any [`tokio::io::AsyncWrite`].
//!
//! # Features
//!
//! - Incremental request parsing that yields the same request however the
//!   input is split across reads
//! - Case-insensitive header table merging repeated names
//! - Response writer that rejects out-of-order calls before writing a byte
//! - Chunked transfer encoding for streamed response bodies
//! - Size limits for the header block and the body, and a read timeout
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use http::StatusCode;
//! use std::sync::Arc;
//! use tcp_http::connection::ResponseWriter;
//! use tcp_http::handler::Handler;
//! use tcp_http::protocol::{Request, WriteError, default_headers};
//! use tcp_http::server::{Server, ServerConfig};
//! use tokio::io::AsyncWrite;
//! use tracing::{Level, info};
//! use tracing_subscriber::FmtSubscriber;
//!
//! struct HelloWorld;
//!
//! #[async_trait]
//! impl Handler for HelloWorld {
//!     type Error = WriteError;
//!
//!     async fn call<W>(&self, request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
//!     where
//!         W: AsyncWrite + Unpin + Send,
//!     {
//!         info!(target = request.target(), "receiving request");
//!
//!         let body = "Hello World!\r\n";
//!         writer.write_status_line(StatusCode::OK).await?;
//!         writer.write_headers(&default_headers(body.len())).await?;
//!         writer.write_body(body.as_bytes()).await?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber)?;
//!
//!     let server = Server::bind("127.0.0.1:42069", ServerConfig::default()).await?;
//!     let mut handle = server.serve(Arc::new(HelloWorld))?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     handle.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: request, header and error types
//! - [`codec`]: the request parser and the response encoders
//! - [`connection`]: one connection from request to response, and the [`connection::ResponseWriter`]
//! - [`handler`]: the [`handler::Handler`] trait
//! - [`server`]: accept loop and [`server::ServerConfig`]
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: anything wrong with the request bytes, or the read failing
//! - [`protocol::WriteError`]: out-of-order writer calls and write failures
//! - [`protocol::HttpError`]: what a connection ended with
//! - [`protocol::ServerError`]: listener and shutdown errors
//!
//! A malformed request is answered with `400 Bad Request` carrying the error
//! text. A failing stream closes the connection without a response.
//!
//! # Limitations
//!
//! - One request per connection, no keep-alive
//! - Request bodies need `Content-Length`; without it the body is empty
//! - Only `GET`, `POST`, `PUT` and `DELETE`
//! - No TLS support (use a reverse proxy for HTTPS)

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
