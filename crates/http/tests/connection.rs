use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use tcp_http::connection::{HttpConnection, ResponseWriter};
use tcp_http::handler::Handler;
use tcp_http::protocol::{HttpError, ParseError, Request, WriteError, default_headers};
use tcp_http::server::ServerConfig;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
enum TestError {
    #[error("boom")]
    Boom,
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error(transparent)]
    Header(#[from] ParseError),
}

struct Routes;

#[async_trait]
impl Handler for Routes {
    type Error = TestError;

    async fn call<W>(&self, request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
    where
        W: AsyncWrite + Unpin + Send,
    {
        match request.target() {
            "/fail" => Err(TestError::Boom),
            "/partial" => {
                writer.write_status_line(StatusCode::OK).await?;
                Err(TestError::Boom)
            }
            "/unfinished" => {
                writer.write_status_line(StatusCode::OK).await?;
                writer.write_headers(&default_headers(0)).await?;
                Ok(())
            }
            "/split-header" => {
                let mut headers = default_headers(0);
                headers.set("X-Name", "a\r\nSet-Cookie: evil=1")?;
                writer.write_status_line(StatusCode::OK).await?;
                writer.write_headers(&headers).await?;
                Ok(())
            }
            "/out-of-order" => {
                writer.write_body(b"too early").await?;
                Ok(())
            }
            "/chunked" => {
                let mut headers = default_headers(0);
                headers.remove("Content-Length");
                headers.set("Transfer-Encoding", "chunked")?;
                writer.write_status_line(StatusCode::OK).await?;
                writer.write_headers(&headers).await?;
                for piece in ["hello", " ", "world"] {
                    writer.write_chunked_body(piece.as_bytes()).await?;
                }
                writer.write_chunked_body_done().await?;
                Ok(())
            }
            _ => {
                let body = request.body();
                writer.write_status_line(StatusCode::OK).await?;
                writer.write_headers(&default_headers(body.len())).await?;
                writer.write_body(body).await?;
                Ok(())
            }
        }
    }
}

/// Write half that fails every operation.
struct BrokenSink;

impl AsyncWrite for BrokenSink {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
    }
}

/// Sends `raw`, closes the sending side and collects everything the connection wrote back.
async fn exchange(raw: &[u8], config: ServerConfig) -> (Result<(), HttpError>, String) {
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let connection = HttpConnection::with_config(server_read, server_write, &config);
    let task = tokio::spawn(connection.process(Arc::new(Routes)));

    let (mut client_read, mut client_write) = tokio::io::split(client);
    client_write.write_all(raw).await.unwrap();
    client_write.shutdown().await.unwrap();

    let mut response = String::new();
    client_read.read_to_string(&mut response).await.unwrap();
    (task.await.unwrap(), response)
}

#[tokio::test]
async fn ok_response() {
    let (result, response) = exchange(b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello", ServerConfig::default()).await;

    assert!(result.is_ok(), "{result:?}");
    assert_eq!(
        response,
        "HTTP/1.1 200 OK\r\ncontent-length: 5\r\ncontent-type: text/plain\r\nconnection: close\r\n\r\nhello"
    );
}

#[tokio::test]
async fn bad_request_carries_error_text() {
    let (result, response) = exchange(b"GET / HTTP/1.1\r\nH@st: v\r\n\r\n", ServerConfig::default()).await;

    assert!(matches!(result, Err(HttpError::Request { source: ParseError::MalformedKey { .. } })), "{result:?}");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");
    assert!(response.contains("content-type: text/plain\r\n"));
    assert!(response.ends_with("malformed key in header line: H@st: v"), "{response}");

    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    assert!(head.contains(&format!("content-length: {}", body.len())));
}

#[tokio::test]
async fn truncated_body_is_bad_request() {
    let (result, response) = exchange(b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhell", ServerConfig::default()).await;

    assert!(matches!(result, Err(HttpError::Request { source: ParseError::InvalidBodySize { .. } })), "{result:?}");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn early_disconnect_is_bad_request() {
    let (result, response) = exchange(b"GET / HTTP/1.1\r\nHost: a\r\n", ServerConfig::default()).await;

    assert!(matches!(result, Err(HttpError::Request { source: ParseError::IncompleteRequest })), "{result:?}");
    assert!(response.ends_with("incomplete request"));
}

#[tokio::test]
async fn chunked_response() {
    let (result, response) = exchange(b"GET /chunked HTTP/1.1\r\n\r\n", ServerConfig::default()).await;

    assert!(result.is_ok(), "{result:?}");
    assert_eq!(
        response,
        "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\nconnection: close\r\ntransfer-encoding: chunked\r\n\r\n\
         5\r\nhello\r\n1\r\n \r\n5\r\nworld\r\n0\r\n\r\n"
    );
}

#[tokio::test]
async fn handler_error_before_writing_is_internal_server_error() {
    let (result, response) = exchange(b"GET /fail HTTP/1.1\r\n\r\n", ServerConfig::default()).await;

    assert!(matches!(result, Err(HttpError::Handler { .. })), "{result:?}");
    assert_eq!(
        response,
        "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\ncontent-type: text/plain\r\nconnection: close\r\n\r\n"
    );
}

#[tokio::test]
async fn handler_error_after_writing_only_closes() {
    let (result, response) = exchange(b"GET /partial HTTP/1.1\r\n\r\n", ServerConfig::default()).await;

    assert!(matches!(result, Err(HttpError::Handler { .. })), "{result:?}");
    assert_eq!(response, "HTTP/1.1 200 OK\r\n");
}

#[tokio::test]
async fn writer_order_error_reaches_handler() {
    let (result, response) = exchange(b"GET /out-of-order HTTP/1.1\r\n\r\n", ServerConfig::default()).await;

    match result {
        Err(HttpError::Handler { source }) => assert!(source.to_string().starts_with("invalid writer state"), "{source}"),
        other => panic!("unexpected result {other:?}"),
    }
    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
}

#[tokio::test]
async fn unfinished_response_still_closes() {
    let (result, response) = exchange(b"GET /unfinished HTTP/1.1\r\n\r\n", ServerConfig::default()).await;

    assert!(result.is_ok(), "{result:?}");
    assert!(response.ends_with("connection: close\r\n\r\n"));
}

#[tokio::test]
async fn header_limit() {
    let config = ServerConfig::default().with_max_header_bytes(64);
    let raw = format!("GET / HTTP/1.1\r\nX-Long: {}\r\n\r\n", "a".repeat(100));
    let (result, response) = exchange(raw.as_bytes(), config).await;

    assert!(matches!(result, Err(HttpError::Request { source: ParseError::TooLargeHeader { max_size: 64, .. } })), "{result:?}");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn body_limit() {
    let config = ServerConfig::default().with_max_body_bytes(4);
    let (result, response) = exchange(b"POST /x HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello", config).await;

    assert!(matches!(result, Err(HttpError::Request { source: ParseError::TooLargeBody { content_length: 5, max_size: 4 } })), "{result:?}");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn tiny_read_buffer() {
    let config = ServerConfig::default().with_read_buffer_size(1);
    let (result, response) = exchange(b"POST /echo HTTP/1.1\r\nHost: a\r\nContent-Length: 11\r\n\r\nhello world", config).await;

    assert!(result.is_ok(), "{result:?}");
    assert!(response.ends_with("\r\n\r\nhello world"));
}

#[tokio::test]
async fn stalled_peer_times_out_without_response() {
    let (client, server) = tokio::io::duplex(1024);
    let (server_read, server_write) = tokio::io::split(server);
    let config = ServerConfig::default().with_read_timeout(Some(Duration::from_millis(50)));
    let connection = HttpConnection::with_config(server_read, server_write, &config);
    let task = tokio::spawn(connection.process(Arc::new(Routes)));

    let (mut client_read, mut client_write) = tokio::io::split(client);
    client_write.write_all(b"GET / HTTP/1.1\r\nHost: a\r\n").await.unwrap();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(HttpError::Timeout { after }) if after == Duration::from_millis(50)), "{result:?}");

    let mut response = Vec::new();
    client_read.read_to_end(&mut response).await.unwrap();
    assert!(response.is_empty());
}

#[tokio::test]
async fn non_utf8_request_is_bad_request() {
    let (result, response) = exchange(b"GET /caf\xe9 HTTP/1.1\r\nX-Bin: \xff\xfe\r\n\r\n", ServerConfig::default()).await;

    assert!(matches!(result, Err(HttpError::Request { source: ParseError::InvalidEncoding { .. } })), "{result:?}");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn non_utf8_header_value_is_bad_request() {
    let (result, response) = exchange(b"GET / HTTP/1.1\r\nX-Bin: \xff\xfe\r\n\r\n", ServerConfig::default()).await;

    assert!(matches!(result, Err(HttpError::Request { source: ParseError::InvalidEncoding { .. } })), "{result:?}");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
}

#[tokio::test]
async fn header_with_line_break_never_reaches_the_wire() {
    let (result, response) = exchange(b"GET /split-header HTTP/1.1\r\n\r\n", ServerConfig::default()).await;

    match result {
        Err(HttpError::Handler { source }) => assert!(source.to_string().starts_with("invalid value for header X-Name"), "{source}"),
        other => panic!("unexpected result {other:?}"),
    }
    assert!(response.starts_with("HTTP/1.1 500 Internal Server Error\r\n"), "{response}");
    assert!(!response.to_ascii_lowercase().contains("set-cookie"), "{response}");
}

#[tokio::test]
async fn failed_bad_request_response_keeps_parse_error() {
    let connection = HttpConnection::new(&b"GET / HTTP/1.1\r\nH@st: v\r\n\r\n"[..], BrokenSink);
    let result = connection.process(Arc::new(Routes)).await;

    assert!(matches!(result, Err(HttpError::Request { source: ParseError::MalformedKey { .. } })), "{result:?}");
}

#[tokio::test]
async fn failed_internal_error_response_keeps_handler_error() {
    let connection = HttpConnection::new(&b"GET /fail HTTP/1.1\r\n\r\n"[..], BrokenSink);
    let result = connection.process(Arc::new(Routes)).await;

    match result {
        Err(HttpError::Handler { source }) => assert_eq!(source.to_string(), "boom"),
        other => panic!("unexpected result {other:?}"),
    }
}
