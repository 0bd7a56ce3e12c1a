//! HTTP request decoder module
//!
//! This module turns a byte stream of arbitrary chunking into a [`Request`].
//! It is split in two layers:
//!
//! - [`RequestParser`]: the protocol state machine. Each call to
//!   [`RequestParser::parse`] performs one step on the bytes it is given and
//!   reports how many of them it consumed.
//! - [`RequestDecoder`]: the driving loop, implemented as a
//!   [`tokio_util::codec::Decoder`]. It repeats parse steps while they make
//!   progress, advances the read buffer after every step, enforces the size
//!   limits and validates the request at end of stream.
//!
//! # State Machine
//!
//! ```text
//! Initialized ──request line──▶ ParsingHeaders ──blank line──▶ ParsingBody ──Content-Length bytes──▶ Done
//!                                      │                                                            ▲
//!                                      └──────────────── no Content-Length ─────────────────────────┘
//! ```
//!
//! The request line and header states are line-oriented. The body state is
//! not: every buffered byte is taken as body, bounded by the declared length.
//!
//! # Example
//!
//! ```no_run
//! use bytes::BytesMut;
//! use tcp_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: a\r\n\r\n"[..]);
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.target(), "/");
//! ```

use bytes::{Buf, BytesMut};
use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::{Decoder, FramedRead};
use tracing::{debug, trace};

use crate::codec::request_line::parse_request_line;
use crate::ensure;
use crate::protocol::{HeaderTable, ParseError, Request, RequestLine};

/// Default limit for the request line plus header block.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 8 * 1024;

/// Default limit for a declared `Content-Length`.
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

const CONTENT_LENGTH: &str = "content-length";

/// Position of a [`RequestParser`] in its linear progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

impl ParseState {
    /// Whether the parser is still reading line-delimited framing.
    #[inline]
    pub fn is_head(&self) -> bool {
        matches!(self, ParseState::Initialized | ParseState::ParsingHeaders)
    }
}

/// Incremental request parser.
///
/// The parser owns the request being built; it never looks at bytes beyond
/// the slice it is handed, and it never blocks. One instance parses exactly
/// one request.
#[derive(Debug)]
pub struct RequestParser {
    state: ParseState,
    request_line: Option<RequestLine>,
    headers: HeaderTable,
    body: BytesMut,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self { state: ParseState::Initialized, request_line: None, headers: HeaderTable::new(), body: BytesMut::new() }
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Body bytes accumulated so far.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The declared body length, `None` when the header is absent or empty.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidContentLength`] if the value is not a non-negative integer.
    pub fn content_length(&self) -> Result<Option<usize>, ParseError> {
        match self.headers.get(CONTENT_LENGTH) {
            None | Some("") => Ok(None),
            Some(value) => value.parse::<usize>().map(Some).map_err(|_e| ParseError::invalid_content_length(value)),
        }
    }

    /// Performs a single state step on `buf` and returns the bytes consumed.
    ///
    /// Zero bytes consumed with an unchanged state means more input is needed.
    /// On error nothing is consumed.
    ///
    /// # Errors
    ///
    /// Any request line or header error, [`ParseError::InvalidContentLength`]
    /// while reading the body, and [`ParseError::TryingToReadAfterDone`] once
    /// the request is complete.
    pub fn parse(&mut self, buf: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParseState::Initialized => {
                let Some((request_line, consumed)) = parse_request_line(buf)? else {
                    return Ok(0);
                };
                trace!(%request_line, "parsed request line");
                self.request_line = Some(request_line);
                self.state = ParseState::ParsingHeaders;
                Ok(consumed)
            }

            ParseState::ParsingHeaders => {
                let result = self.headers.parse(buf)?;
                if result.done {
                    self.state = match self.headers.get(CONTENT_LENGTH) {
                        None | Some("") => ParseState::Done,
                        Some(_) => ParseState::ParsingBody,
                    };
                }
                Ok(result.consumed)
            }

            ParseState::ParsingBody => {
                let Some(content_length) = self.content_length()? else {
                    self.state = ParseState::Done;
                    return Ok(0);
                };

                self.body.extend_from_slice(buf);
                if self.body.len() >= content_length {
                    self.state = ParseState::Done;
                }
                Ok(buf.len())
            }

            ParseState::Done => Err(ParseError::TryingToReadAfterDone),
        }
    }

    /// Checks that the accumulated body matches the declared `Content-Length`.
    ///
    /// # Errors
    ///
    /// [`ParseError::InvalidBodySize`] on a length mismatch in either direction,
    /// [`ParseError::InvalidContentLength`] for a non-numeric declaration.
    pub fn check_body_size(&self) -> Result<(), ParseError> {
        if let Some(content_length) = self.content_length()? {
            ensure!(self.body.len() == content_length, ParseError::invalid_body_size(content_length, self.body.len()));
        }
        Ok(())
    }

    /// Hands out the completed request, leaving the parser in [`ParseState::Done`].
    ///
    /// # Errors
    ///
    /// [`ParseError::IncompleteRequest`] if the parser is not done, or the
    /// request was already taken; [`ParseError::InvalidBodySize`] if more bytes
    /// than declared were accumulated.
    pub fn take_request(&mut self) -> Result<Request, ParseError> {
        ensure!(self.is_done(), ParseError::IncompleteRequest);
        self.check_body_size()?;

        let request_line = self.request_line.take().ok_or(ParseError::IncompleteRequest)?;
        let headers = std::mem::take(&mut self.headers);
        let body = self.body.split().freeze();
        Ok(Request::new(request_line, headers, body))
    }
}

/// [`Decoder`] driving a [`RequestParser`] over a growing [`BytesMut`].
///
/// Used through [`FramedRead`], which appends every read to the buffer and
/// grows it on demand; the decoder advances the buffer past each consumed
/// prefix, so memory stays bounded by one in-flight request.
#[derive(Debug)]
pub struct RequestDecoder {
    parser: RequestParser,
    head_bytes: usize,
    max_header_bytes: usize,
    max_body_bytes: usize,
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_HEADER_BYTES, DEFAULT_MAX_BODY_BYTES)
    }
}

impl RequestDecoder {
    /// Creates a decoder with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_header_bytes: usize, max_body_bytes: usize) -> Self {
        Self { parser: RequestParser::new(), head_bytes: 0, max_header_bytes, max_body_bytes }
    }

    pub fn parser(&self) -> &RequestParser {
        &self.parser
    }

    /// `pending` only counts when the step stalled: it is then the unfinished line.
    fn check_limits(&self, before: ParseState, stalled: bool, pending: usize) -> Result<(), ParseError> {
        let state = self.parser.state();

        if before.is_head() || state.is_head() {
            let current_size = if stalled { self.head_bytes + pending } else { self.head_bytes };
            ensure!(current_size <= self.max_header_bytes, ParseError::too_large_header(current_size, self.max_header_bytes));
        }

        if before != ParseState::ParsingBody && state == ParseState::ParsingBody {
            // a bad value is reported by the next parse step
            if let Ok(Some(content_length)) = self.parser.content_length() {
                ensure!(content_length <= self.max_body_bytes, ParseError::too_large_body(content_length, self.max_body_bytes));
            }
        }

        Ok(())
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Runs parse steps until the request is complete or no progress is made.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request is complete
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the bytes received so far can never form a valid request
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let before = self.parser.state();
            let consumed = self.parser.parse(src)?;
            src.advance(consumed);

            if before.is_head() {
                self.head_bytes += consumed;
            }

            let after = self.parser.state();
            trace!(?before, ?after, consumed, remaining = src.len(), "request parse step");

            let stalled = consumed == 0 && before == after;
            self.check_limits(before, stalled, src.len())?;

            if after == ParseState::Done {
                let request = self.parser.take_request()?;
                debug!(request_line = %request.request_line(), headers = request.headers().len(), body_size = request.body().len(), "decoded request");
                return Ok(Some(request));
            }

            if stalled {
                return Ok(None);
            }
        }
    }

    /// Called once the peer closed its side of the stream.
    ///
    /// A body that stopped short of its declared length fails with
    /// [`ParseError::InvalidBodySize`]; any other unfinished request fails with
    /// [`ParseError::IncompleteRequest`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.parser.is_done() && src.is_empty() {
            return Ok(None);
        }

        if let Some(request) = self.decode(src)? {
            return Ok(Some(request));
        }

        if self.parser.state() == ParseState::ParsingBody {
            self.parser.check_body_size()?;
        }

        Err(ParseError::IncompleteRequest)
    }
}

/// Reads exactly one request from `reader`.
///
/// # Errors
///
/// Any [`ParseError`]; a stream that ends before a complete request fails
/// with [`ParseError::IncompleteRequest`] or [`ParseError::InvalidBodySize`].
pub async fn read_request<R>(reader: R) -> Result<Request, ParseError>
where
    R: AsyncRead + Unpin,
{
    let mut framed_read = FramedRead::new(reader, RequestDecoder::new());
    framed_read.next().await.unwrap_or(Err(ParseError::IncompleteRequest))
}
