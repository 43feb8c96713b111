//! The handler served by the `httpwire` binary.
//!
//! - `/yourproblem` → 400 page
//! - `/myproblem` → 500 page
//! - `/stream/<n>` → `n` lines sent chunked, followed by checksum trailers
//! - anything else → 200 page

use data_encoding::HEXLOWER;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;

use crate::http::handler::Handler;
use crate::http::headers::Headers;
use crate::http::request::Request;
use crate::http::response::{default_headers, StatusCode};
use crate::http::writer::ResponseWriter;

/// Upper bound on lines produced by `/stream/<n>`.
pub const MAX_STREAM_LINES: usize = 100;

const BAD_REQUEST_PAGE: &str = "<html>
  <head>
    <title>400 Bad Request</title>
  </head>
  <body>
    <h1>Bad Request</h1>
    <p>Your request honestly kinda sucked.</p>
  </body>
</html>";

const INTERNAL_ERROR_PAGE: &str = "<html>
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

#[derive(Debug, Clone, Copy, Default)]
pub struct DemoHandler;

impl Handler for DemoHandler {
    async fn handle<W>(&self, request: &Request, writer: &mut ResponseWriter<W>) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let target = request.target();

        if let Some(count) = target.strip_prefix("/stream/") {
            let count: usize = count.parse().unwrap_or(0);
            return stream_lines(writer, count.min(MAX_STREAM_LINES)).await;
        }

        let (status, page) = match target {
            "/yourproblem" => (StatusCode::BAD_REQUEST, BAD_REQUEST_PAGE),
            "/myproblem" => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_PAGE),
            _ => (StatusCode::OK, OK_PAGE),
        };

        let mut headers = default_headers(0);
        headers.replace("Content-Length", &page.len().to_string())?;
        headers.replace("Content-Type", "text/html")?;

        writer.write_status_line(status).await?;
        writer.write_headers(&headers).await?;
        writer.write_body(page.as_bytes()).await?;
        Ok(())
    }
}

/// Sends `count` lines as separate chunks, then the body's SHA-256 and
/// length as trailers.
async fn stream_lines<W>(writer: &mut ResponseWriter<W>, count: usize) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = default_headers(0);
    headers.remove("Content-Length");
    headers.set("Transfer-Encoding", "chunked")?;
    headers.set("Trailer", "X-Content-SHA256")?;
    headers.set("Trailer", "X-Content-Length")?;

    writer.write_status_line(StatusCode::OK).await?;
    writer.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut total = 0;
    for i in 0..count {
        let line = format!("line {i}\n");
        hasher.update(line.as_bytes());
        total += writer.write_chunked_body(line.as_bytes()).await?;
    }
    writer.write_chunked_body_done().await?;

    let mut trailers = Headers::new();
    trailers.set("X-Content-SHA256", &HEXLOWER.encode(&hasher.finalize()))?;
    trailers.set("X-Content-Length", &total.to_string())?;
    writer.write_trailers(&trailers).await?;

    tracing::debug!(lines = count, bytes = total, "Streamed chunked body");
    Ok(())
}
