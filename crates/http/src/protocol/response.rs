//! Response-side protocol helpers.
//!
//! The writer itself lives in [`connection`](crate::connection); this module
//! holds the pieces a handler needs before it starts writing: reason phrases
//! and the default header set.

use http::StatusCode;

use crate::protocol::HeaderTable;

/// Returns the reason phrase written after `status` on the status line.
///
/// `200`, `400` and `500` map to their fixed phrases. Any other code uses its
/// canonical reason if one is registered, and an empty phrase otherwise.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200 => "OK",
        400 => "Bad Request",
        500 => "Internal Server Error",
        _ => status.canonical_reason().unwrap_or(""),
    }
}

/// Builds the header table every response starts from.
///
/// Contains `Content-Length` set to `content_len`, `Content-Type: text/plain`
/// and `Connection: close`. Callers overwrite entries with
/// [`HeaderTable::set`] before handing the table to the writer.
pub fn default_headers(content_len: usize) -> HeaderTable {
    let mut headers = HeaderTable::new();
    headers.merge(http::header::CONTENT_LENGTH.as_str(), &content_len.to_string());
    headers.merge(http::header::CONTENT_TYPE.as_str(), mime::TEXT_PLAIN.as_ref());
    headers.merge(http::header::CONNECTION.as_str(), "close");
    headers
}
