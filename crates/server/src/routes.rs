use async_trait::async_trait;
use http::StatusCode;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use tcp_http::connection::ResponseWriter;
use tcp_http::handler::Handler;
use tcp_http::protocol::{HttpError, Request, default_headers};
use tokio::io::AsyncWrite;
use tracing::info;

const BAD_REQUEST_PAGE: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>";

const INTERNAL_SERVER_ERROR_PAGE: &str = "<html>
  <head>
    <title>500 Internal Server Error</title>
  </head>
  <body>
    <h1>Internal Server Error</h1>
    <p>Okay, you know what? This one is on me.</p>
  </body>
</html>";

const OK_PAGE: &str = "<html>
  <head>
    <title>200 OK</title>
  </head>
  <body>
    <h1>Success!</h1>
    <p>Your request was an absolute banger.</p>
  </body>
</html>";

const CHUNKED_PREFIX: &str = "/chunked/";
const MAX_CHUNKS: u16 = 1000;

/// The demo routes:
///
/// - `/yourproblem`: `400` page
/// - `/myproblem`: `500` page
/// - `/chunked/<n>`: `n` lines streamed as separate chunks
/// - anything else: `200` page
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoHandler;

#[async_trait]
impl Handler for DemoHandler {
    type Error = HttpError;

    async fn call<W>(&self, request: &Request, writer: &mut ResponseWriter<W>) -> Result<(), Self::Error>
    where
        W: AsyncWrite + Unpin + Send,
    {
        info!(method = %request.method(), target = request.target(), "handling request");

        match request.target() {
            "/yourproblem" => write_html(writer, StatusCode::BAD_REQUEST, BAD_REQUEST_PAGE).await,
            "/myproblem" => write_html(writer, StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_PAGE).await,
            target => match target.strip_prefix(CHUNKED_PREFIX).map(str::parse::<u16>) {
                Some(Ok(count)) if count <= MAX_CHUNKS => write_chunks(writer, count).await,
                Some(_) => write_html(writer, StatusCode::BAD_REQUEST, BAD_REQUEST_PAGE).await,
                None => write_html(writer, StatusCode::OK, OK_PAGE).await,
            },
        }
    }
}

async fn write_html<W>(writer: &mut ResponseWriter<W>, status: StatusCode, page: &str) -> Result<(), HttpError>
where
    W: AsyncWrite + Unpin,
{
    let mut headers = default_headers(page.len());
    headers.set(CONTENT_TYPE.as_str(), mime::TEXT_HTML.as_ref())?;

    writer.write_status_line(status).await?;
    writer.write_headers(&headers).await?;
    writer.write_body(page.as_bytes()).await?;
    Ok(())
}

async fn write_chunks<W>(writer: &mut ResponseWriter<W>, count: u16) -> Result<(), HttpError>
where
    W: AsyncWrite + Unpin,
{
    let mut headers = default_headers(0);
    headers.remove(CONTENT_LENGTH.as_str());
    headers.set(TRANSFER_ENCODING.as_str(), "chunked")?;

    writer.write_status_line(StatusCode::OK).await?;
    writer.write_headers(&headers).await?;
    for i in 0..count {
        writer.write_chunked_body(format!("chunk {i}\n").as_bytes()).await?;
    }
    writer.write_chunked_body_done().await?;
    Ok(())
}
