use std::error::Error as StdError;
use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::connection::WriterState;

/// Connection-level error returned by [`HttpConnection::process`](crate::connection::HttpConnection::process).
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    Request {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    Response {
        #[from]
        source: WriteError,
    },

    #[error("handler error: {source}")]
    Handler { source: Box<dyn StdError + Send + Sync> },

    #[error("no complete request received within {after:?}")]
    Timeout { after: Duration },
}

impl HttpError {
    pub fn handler<E: Into<Box<dyn StdError + Send + Sync>>>(e: E) -> Self {
        Self::Handler { source: e.into() }
    }

    /// Whether the failure happened on the transport rather than in the protocol.
    ///
    /// Transport failures close the connection without sending a response.
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Request { source } => source.is_transport(),
            Self::Response { source } => source.is_io(),
            Self::Timeout { .. } => true,
            Self::Handler { .. } => false,
        }
    }
}

/// Errors produced while turning raw bytes into a [`Request`](crate::protocol::Request).
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line: {line}")]
    RequestLineMalformed { line: String },

    #[error("invalid method: {method}")]
    InvalidMethod { method: String },

    #[error("invalid target: {target}")]
    InvalidTarget { target: String },

    #[error("invalid version: {version}")]
    InvalidVersion { version: String },

    #[error("missing key-value pair in header line: {line}")]
    MalformedKeyValuePair { line: String },

    #[error("trailing white space in key in header line: {line}")]
    TrailingSpaceInKey { line: String },

    #[error("empty key in header line: {line}")]
    EmptyKey { line: String },

    #[error("malformed key in header line: {line}")]
    MalformedKey { line: String },

    #[error("invalid value for header {name}: {value:?}")]
    InvalidHeaderValue { name: String, value: String },

    #[error("request is not valid UTF-8: {line}")]
    InvalidEncoding { line: String },

    #[error("invalid content-length header: {value}")]
    InvalidContentLength { value: String },

    #[error("body size {body_size} does not match content-length {content_length}")]
    InvalidBodySize { content_length: usize, body_size: usize },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("content-length {content_length} exceed the body limit {max_size}")]
    TooLargeBody { content_length: usize, max_size: usize },

    #[error("trying to read after done")]
    TryingToReadAfterDone,

    #[error("incomplete request")]
    IncompleteRequest,

    #[error("reading request: {source}")]
    UnexpectedRead {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn request_line_malformed<S: ToString>(line: S) -> Self {
        Self::RequestLineMalformed { line: line.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn invalid_target<S: ToString>(target: S) -> Self {
        Self::InvalidTarget { target: target.to_string() }
    }

    pub fn invalid_version<S: ToString>(version: S) -> Self {
        Self::InvalidVersion { version: version.to_string() }
    }

    pub fn malformed_key_value_pair<S: ToString>(line: S) -> Self {
        Self::MalformedKeyValuePair { line: line.to_string() }
    }

    pub fn trailing_space_in_key<S: ToString>(line: S) -> Self {
        Self::TrailingSpaceInKey { line: line.to_string() }
    }

    pub fn empty_key<S: ToString>(line: S) -> Self {
        Self::EmptyKey { line: line.to_string() }
    }

    pub fn malformed_key<S: ToString>(line: S) -> Self {
        Self::MalformedKey { line: line.to_string() }
    }

    pub fn invalid_header_value<N: ToString, V: ToString>(name: N, value: V) -> Self {
        Self::InvalidHeaderValue { name: name.to_string(), value: value.to_string() }
    }

    pub fn invalid_encoding<S: ToString>(line: S) -> Self {
        Self::InvalidEncoding { line: line.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(value: S) -> Self {
        Self::InvalidContentLength { value: value.to_string() }
    }

    pub fn invalid_body_size(content_length: usize, body_size: usize) -> Self {
        Self::InvalidBodySize { content_length, body_size }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_large_body(content_length: usize, max_size: usize) -> Self {
        Self::TooLargeBody { content_length, max_size }
    }

    /// `true` for read failures of the underlying stream, `false` for anything the peer sent.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::UnexpectedRead { .. })
    }
}

/// Errors produced by the [`ResponseWriter`](crate::connection::ResponseWriter).
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("invalid writer state: current {current:?}, expected {expected:?}")]
    InvalidWriterState { current: WriterState, expected: WriterState },

    #[error("writing status line: {source}")]
    WritingStatusLine { source: io::Error },

    #[error("writing headers: {source}")]
    WritingHeaders { source: io::Error },

    #[error("writing body: {source}")]
    WritingBody { source: io::Error },

    #[error("writing chunked body: {source}")]
    WritingChunkedBody { source: io::Error },
}

impl WriteError {
    pub fn invalid_state(current: WriterState, expected: WriterState) -> Self {
        Self::InvalidWriterState { current, expected }
    }

    /// Whether the failure came from the sink rather than from the call order.
    pub fn is_io(&self) -> bool {
        !matches!(self, Self::InvalidWriterState { .. })
    }
}

/// Errors of the accept loop owned by [`Server`](crate::server::Server).
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("listening on address: {source}")]
    Listener { source: io::Error },

    #[error("server already closed")]
    AlreadyClosed,

    #[error("closing server: {source}")]
    Close {
        #[from]
        source: tokio::task::JoinError,
    },
}
