//! Request line parsing: `<METHOD> <TARGET> HTTP/1.1\r\n`.

use crate::ensure;
use crate::protocol::{CRLF, HTTP_VERSION, Method, ParseError, RequestLine, find_crlf};

/// Parses the request line at the front of `buf`.
///
/// Returns `Ok(None)` when no complete line is buffered yet. On success returns
/// the line together with the number of bytes it occupied, CRLF included.
/// Errors never consume anything: the caller keeps its buffer untouched.
///
/// # Errors
///
/// - [`ParseError::InvalidEncoding`] if the line is not valid UTF-8
/// - [`ParseError::RequestLineMalformed`] unless the line has exactly three space-separated parts
/// - [`ParseError::InvalidMethod`] for anything outside `GET|POST|PUT|DELETE`
/// - [`ParseError::InvalidTarget`] if the target does not start with `/`
/// - [`ParseError::InvalidVersion`] unless the version is exactly `HTTP/1.1`
pub fn parse_request_line(buf: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(line_end) = find_crlf(buf) else {
        return Ok(None);
    };

    let raw = &buf[..line_end];
    let line = std::str::from_utf8(raw).map_err(|_e| ParseError::invalid_encoding(String::from_utf8_lossy(raw)))?;
    let parts: Vec<&str> = line.split(' ').collect();
    let [method, target, version] = parts[..] else {
        return Err(ParseError::request_line_malformed(line));
    };

    let method = method.parse::<Method>()?;
    ensure!(target.starts_with('/'), ParseError::invalid_target(target));
    ensure!(version == HTTP_VERSION, ParseError::invalid_version(version));

    let http_version = version.split_once('/').map(|(_, number)| number).ok_or_else(|| ParseError::invalid_version(version))?;

    let request_line = RequestLine::new(method, target.to_string(), http_version.to_string());
    Ok(Some((request_line, line_end + CRLF.len())))
}
