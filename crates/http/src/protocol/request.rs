//! Parsed request types.
//!
//! A [`Request`] is only ever produced by the
//! [`RequestParser`](crate::codec::RequestParser) once it reaches its final
//! state, so every value of these types already satisfies the framing rules:
//! the method is one of the four supported verbs, the target starts with `/`,
//! and the version is `1.1`.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::protocol::{HeaderTable, ParseError};

/// The request methods accepted by the parser.
#[allow(clippy::upper_case_acronyms, reason = "methods are spelled the way they appear on the wire")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
}

impl Method {
    /// Every accepted method, in the order they are matched.
    pub const ALL: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
        }
    }
}

/// Matching is case-sensitive: `get` is rejected.
impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL.into_iter().find(|method| method.as_str() == s).ok_or_else(|| ParseError::invalid_method(s))
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first line of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    target: String,
    http_version: String,
}

impl RequestLine {
    pub(crate) fn new(method: Method, target: String, http_version: String) -> Self {
        Self { method, target, http_version }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The request target, always starting with `/`.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The numeric part of the protocol version, e.g. `"1.1"`.
    pub fn http_version(&self) -> &str {
        &self.http_version
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} HTTP/{}", self.method, self.target, self.http_version)
    }
}

/// A fully parsed HTTP/1.1 request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    request_line: RequestLine,
    headers: HeaderTable,
    body: Bytes,
}

impl Request {
    pub(crate) fn new(request_line: RequestLine, headers: HeaderTable, body: Bytes) -> Self {
        Self { request_line, headers, body }
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn method(&self) -> Method {
        self.request_line.method
    }

    pub fn target(&self) -> &str {
        &self.request_line.target
    }

    pub fn http_version(&self) -> &str {
        &self.request_line.http_version
    }

    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Shortcut for `headers().get(name)`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The body bytes; empty when no `Content-Length` was sent.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_from_str() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::GET);
        assert_eq!("POST".parse::<Method>().unwrap(), Method::POST);
        assert_eq!("PUT".parse::<Method>().unwrap(), Method::PUT);
        assert_eq!("DELETE".parse::<Method>().unwrap(), Method::DELETE);
    }

    #[test]
    fn method_is_case_sensitive() {
        for raw in ["get", "Post", "PATCH", "HEAD", ""] {
            match raw.parse::<Method>() {
                Err(ParseError::InvalidMethod { method }) => assert_eq!(method, raw),
                other => panic!("unexpected result for {raw:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn request_line_display() {
        let line = RequestLine::new(Method::PUT, "/a/b?c=d".to_string(), "1.1".to_string());
        assert_eq!(line.to_string(), "PUT /a/b?c=d HTTP/1.1");
    }
}
